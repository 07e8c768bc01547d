//! Module parameters of the reward application.
use ibc_core::channel::types::channel::Order;
use ibc_core::channel::types::Version;
use ibc_core::host::types::identifiers::PortId;
use ibc_core::primitives::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{PORT_ID_STR, VERSION};

/// What happens to escrowed coins once the counterparty acknowledges receipt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowPolicy {
    /// Mint-and-burn: the escrowed coins are burned.
    #[default]
    BurnOnAck,
    /// Lock-and-release: the escrowed coins stay in the module account and
    /// are accounted as locked against the channel.
    LockOnAck,
}

/// Parameters the host hands to the reward application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardParams {
    pub port_id: PortId,
    pub version: Version,
    pub ordering: Order,
    pub escrow_policy: EscrowPolicy,
    pub send_enabled: bool,
    pub receive_enabled: bool,
}

impl RewardParams {
    pub fn with_ordering(mut self, ordering: Order) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_escrow_policy(mut self, escrow_policy: EscrowPolicy) -> Self {
        self.escrow_policy = escrow_policy;
        self
    }
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            port_id: reward_port_id(),
            version: Version::new(VERSION.to_string()),
            ordering: Order::Unordered,
            escrow_policy: EscrowPolicy::default(),
            send_enabled: true,
            receive_enabled: true,
        }
    }
}

/// The default port of the reward application.
pub fn reward_port_id() -> PortId {
    PORT_ID_STR
        .parse()
        .expect("reward port identifier is never supposed to be invalid")
}

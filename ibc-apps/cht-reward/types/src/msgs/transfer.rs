//! Defines the reward transfer message type
use ibc_core::channel::types::timeout::TimeoutHeight;
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};

use crate::error::RewardError;
use crate::Memo;

/// Message used to relay a delegator's rewards over a reward channel.
///
/// The message does not carry the payload. The snapshot is read from the
/// staking and distribution keepers when the message is executed, so that it
/// reflects the state of the chain at send time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRewardTransfer {
    /// the port on which the packet will be sent
    pub port_id_on_a: PortId,
    /// the channel by which the packet will be sent
    pub chan_id_on_a: ChannelId,
    /// the delegator whose rewards are relayed, and who pays the escrow
    pub delegator: Signer,
    /// the account credited on the counterparty chain
    pub receiver: Signer,
    pub memo: Memo,
    /// Timeout height on the counterparty chain.
    /// The timeout is disabled when set to `TimeoutHeight::Never`.
    pub timeout_height_on_b: TimeoutHeight,
    /// Timeout timestamp on the counterparty chain.
    /// The timeout is disabled when unset.
    pub timeout_timestamp_on_b: Timestamp,
}

impl MsgRewardTransfer {
    /// Stateless checks of the message.
    pub fn validate_basic(&self) -> Result<(), RewardError> {
        // Packet timeout height and packet timeout timestamp cannot both be unset.
        if self.timeout_height_on_b == TimeoutHeight::Never
            && self.timeout_timestamp_on_b.nanoseconds() == 0
        {
            return Err(RewardError::MissingTimeout);
        }
        if self.receiver.to_string().trim().is_empty() {
            return Err(RewardError::EmptyReceiver);
        }
        Ok(())
    }
}

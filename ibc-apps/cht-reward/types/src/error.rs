//! Defines the reward application error type
use core::convert::Infallible;

use displaydoc::Display;
use ibc_core::channel::types::acknowledgement::StatusValue;
use ibc_core::channel::types::channel::Order;
use ibc_core::channel::types::Version;
use ibc_core::client::types::Height;
use ibc_core::host::types::error::IdentifierError;
use ibc_core::host::types::identifiers::{ChannelId, PortId, Sequence};
use ibc_core::primitives::prelude::*;
use uint::FromDecStrErr;

use crate::{HandshakeState, PacketStatus};

/// Broad classes of [`RewardError`], used by callers that need to decide
/// whether a failure is fatal to the enclosing operation or becomes an error
/// acknowledgement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Capability authentication failed.
    Permission,
    /// Malformed input, unsupported version, bad timeout or channel state.
    Validation,
    InsufficientFunds,
    /// A bank or module policy forbids the movement of funds.
    PolicyBlocked,
    /// Sequence order violated on an ordered channel.
    ProtocolOrder,
    NotFound,
    /// A keeper failed on its own.
    Host,
}

#[derive(Display, Debug)]
pub enum RewardError {
    /// capability authentication failed for port `{port_id}` channel `{channel_id}`
    CapabilityAuthentication {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// port `{port_id}` capability is not owned by the reward module
    PortCapabilityNotOwned { port_id: PortId },
    /// port `{port_id}` is already bound
    PortAlreadyBound { port_id: PortId },
    /// port `{port_id}` is reserved by the fungible token transfer application
    ReservedPort { port_id: PortId },
    /// capability `{name}` is already claimed
    CapabilityAlreadyClaimed { name: String },
    /// invalid identifier: `{0}`
    InvalidIdentifier(IdentifierError),
    /// invalid port: `{port_id}`, expected `{exp_port_id}`
    InvalidPort {
        port_id: PortId,
        exp_port_id: PortId,
    },
    /// unsupported version: expected `{expected}`, actual `{actual}`
    UnsupportedVersion { expected: Version, actual: Version },
    /// expected `{expect_order}` channel, got `{got_order}`
    InvalidChannelOrder {
        expect_order: Order,
        got_order: Order,
    },
    /// channel `{channel_id}` on port `{port_id}` is in state `{state}`, expected `{expected}`
    InvalidHandshakeState {
        port_id: PortId,
        channel_id: ChannelId,
        state: HandshakeState,
        expected: String,
    },
    /// channel `{channel_id}` on port `{port_id}` is not open
    ChannelNotOpen {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// channel `{channel_id}` on port `{port_id}` has no connection hops
    MissingConnectionHops {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// destination channel not found in the counterparty of port_id `{port_id}` and channel_id `{channel_id}`
    DestinationChannelNotFound {
        port_id: PortId,
        channel_id: ChannelId,
    },
    /// packet timeout height and timestamp cannot both be unset
    MissingTimeout,
    /// timeout height `{timeout_height}` has already elapsed at counterparty height `{latest_height}`
    TimeoutHeightElapsed {
        timeout_height: Height,
        latest_height: Height,
    },
    /// timeout timestamp `{timeout_timestamp}` has already elapsed at counterparty time `{latest_timestamp}`
    TimeoutTimestampElapsed {
        timeout_timestamp: u64,
        latest_timestamp: u64,
    },
    /// invalid amount error: `{0}`
    InvalidAmount(FromDecStrErr),
    /// amount overflow
    AmountOverflow,
    /// denomination is empty
    EmptyDenom,
    /// invalid denomination `{denom}`
    InvalidDenom { denom: String },
    /// invalid validator address `{address}`
    InvalidValidatorAddress { address: String },
    /// validator `{validator}` appears more than once
    DuplicateValidator { validator: String },
    /// reward entries are not sorted by validator address
    UnsortedRewardEntries,
    /// reward entries sum to `{entries_total}` but the packet carries `{amount}`
    RewardTotalMismatch { entries_total: String, amount: String },
    /// delegator `{delegator}` has no delegations
    NoDelegations { delegator: String },
    /// validator `{validator}` not found
    ValidatorNotFound { validator: String },
    /// delegator `{delegator}` has no rewards to relay
    NothingToRelay { delegator: String },
    /// empty receiver address
    EmptyReceiver,
    /// failed to deserialize packet data
    PacketDataDeserialization,
    /// failed to deserialize acknowledgement
    AckDeserialization,
    /// insufficient funds: tried to send `{send_attempt}`, sender only has `{available_funds}`
    InsufficientFunds {
        send_attempt: String,
        available_funds: String,
    },
    /// send is not enabled: `{reason}`
    SendDisabled { reason: String },
    /// receive is not enabled: `{reason}`
    ReceiveDisabled { reason: String },
    /// address `{address}` is not allowed to receive funds
    BlockedAddress { address: String },
    /// out of order packet on port `{port_id}` channel `{channel_id}`: expected sequence `{expected}`, got `{actual}`
    OutOfOrderPacket {
        port_id: PortId,
        channel_id: ChannelId,
        expected: Sequence,
        actual: Sequence,
    },
    /// no packet with sequence `{sequence}` was sent on port `{port_id}` channel `{channel_id}`
    PacketNotFound {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    /// packet `{sequence}` is in status `{status}` and cannot be resolved
    PacketNotResolvable {
        sequence: Sequence,
        status: PacketStatus,
    },
    /// escrow of `{denom}` on channel `{channel_id}` holds `{in_escrow}`, cannot release `{requested}`
    EscrowUnderflow {
        channel_id: ChannelId,
        denom: String,
        in_escrow: String,
        requested: String,
    },
    /// host error: `{description}`
    Host { description: String },
}

impl RewardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityAuthentication { .. } | Self::PortCapabilityNotOwned { .. } => {
                ErrorKind::Permission
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::SendDisabled { .. }
            | Self::ReceiveDisabled { .. }
            | Self::BlockedAddress { .. }
            | Self::ReservedPort { .. } => ErrorKind::PolicyBlocked,
            Self::OutOfOrderPacket { .. } => ErrorKind::ProtocolOrder,
            Self::NoDelegations { .. }
            | Self::ValidatorNotFound { .. }
            | Self::PacketNotFound { .. } => ErrorKind::NotFound,
            Self::Host { .. } | Self::EscrowUnderflow { .. } => ErrorKind::Host,
            _ => ErrorKind::Validation,
        }
    }

    /// Convenience constructor for keeper implementations.
    pub fn host(description: impl ToString) -> Self {
        Self::Host {
            description: description.to_string(),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RewardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            Self::InvalidIdentifier(e) => Some(e),
            Self::InvalidAmount(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Infallible> for RewardError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

impl From<IdentifierError> for RewardError {
    fn from(err: IdentifierError) -> RewardError {
        Self::InvalidIdentifier(err)
    }
}

impl From<RewardError> for StatusValue {
    fn from(err: RewardError) -> Self {
        StatusValue::new(err.to_string()).expect("error message must not be empty")
    }
}

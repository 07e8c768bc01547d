//! Records the reward application keeps in its own store.
use core::fmt::{self, Display};

use ibc_core::channel::types::channel::Order;
use ibc_core::channel::types::Version;
use ibc_core::primitives::Signer;

use crate::{Capability, Coin};

/// Handshake progress of a channel bound to the reward port.
///
/// A channel with no record is uninitialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    Init,
    TryOpen,
    Open,
    Closed,
}

impl Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Init => "INIT",
            Self::TryOpen => "TRYOPEN",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        };
        write!(f, "{state}")
    }
}

/// Per-channel state owned by the reward application.
#[derive(Clone, Debug)]
pub struct ChannelRecord {
    pub state: HandshakeState,
    pub version: Version,
    pub ordering: Order,
    /// Channel capability issued during `Init`/`TryOpen`, held until it is
    /// claimed on `Ack`/`Confirm`.
    pub pending_capability: Option<Capability>,
}

impl ChannelRecord {
    pub fn is_open(&self) -> bool {
        self.state == HandshakeState::Open
    }
}

/// Resolution marker of a sent packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketStatus {
    /// Escrow debited, commitment not yet accepted by the channel keeper.
    PendingSend,
    Sent,
    AckedSuccess,
    AckedFailure,
    TimedOut,
    /// Refunded because the channel closed while the packet was in flight.
    RefundedOnClose,
}

impl PacketStatus {
    /// Whether the escrow of the packet has been finalized or reversed.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::PendingSend | Self::Sent)
    }
}

impl Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::PendingSend => "PENDING_SEND",
            Self::Sent => "SENT",
            Self::AckedSuccess => "ACKED_SUCCESS",
            Self::AckedFailure => "ACKED_FAILURE",
            Self::TimedOut => "TIMED_OUT",
            Self::RefundedOnClose => "REFUNDED_ON_CLOSE",
        };
        write!(f, "{status}")
    }
}

/// What the source chain remembers about a packet it sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketRecord {
    pub sender: Signer,
    pub receiver: Signer,
    pub coin: Coin,
    pub status: PacketStatus,
}

impl PacketRecord {
    pub fn with_status(mut self, status: PacketStatus) -> Self {
        self.status = status;
        self
    }
}

/// Per-channel, per-denom escrow accounting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EscrowRecord {
    /// Debited from senders and awaiting a terminal resolution.
    pub in_flight: crate::Amount,
    /// Finalized under [`EscrowPolicy::LockOnAck`](crate::EscrowPolicy::LockOnAck).
    pub locked: crate::Amount,
}

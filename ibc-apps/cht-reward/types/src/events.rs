//! Defines all reward application event types
use ibc_core::channel::types::acknowledgement::AcknowledgementStatus;
use ibc_core::host::types::identifiers::{ChannelId, Sequence};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;
use ibc_core::router::types::event::ModuleEvent;

use crate::{Amount, Denom, Memo, PacketStatus, ValidatorAddress, MODULE_ID_STR};

pub const EVENT_TYPE_TRANSFER: &str = "cht_reward_transfer";
pub const EVENT_TYPE_PACKET: &str = "cht_reward_packet";
pub const EVENT_TYPE_TIMEOUT: &str = "cht_reward_timeout";
pub const EVENT_TYPE_CHANNEL_REFUND: &str = "cht_reward_channel_refund";
pub const EVENT_TYPE_DUPLICATE_RESOLUTION: &str = "cht_reward_duplicate_resolution";

/// Contains all events variants that can be emitted from the reward application
pub enum Event {
    Transfer(TransferEvent),
    Recv(RecvEvent),
    Ack(AckEvent),
    AckStatus(AckStatusEvent),
    Timeout(TimeoutEvent),
    ChannelRefund(ChannelRefundEvent),
    DuplicateResolution(DuplicateResolutionEvent),
}

/// Event emitted after a successful reward transfer was committed
pub struct TransferEvent {
    pub sender: Signer,
    pub receiver: Signer,
    pub denom: Denom,
    pub amount: Amount,
    pub validators: Vec<ValidatorAddress>,
    pub memo: Memo,
}

impl From<TransferEvent> for ModuleEvent {
    fn from(ev: TransferEvent) -> Self {
        let TransferEvent {
            sender,
            receiver,
            denom,
            amount,
            validators,
            memo,
        } = ev;
        let validators = validators
            .iter()
            .map(ValidatorAddress::as_str)
            .collect::<Vec<_>>()
            .join(",");

        Self {
            kind: EVENT_TYPE_TRANSFER.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("sender", sender).into(),
                ("receiver", receiver).into(),
                ("denom", denom).into(),
                ("amount", amount).into(),
                ("validators", validators).into(),
                ("memo", memo).into(),
            ],
        }
    }
}

/// Event emitted by the `onRecvPacket` callback once the packet was processed
pub struct RecvEvent {
    pub sender: Signer,
    pub receiver: Signer,
    pub denom: Denom,
    pub amount: Amount,
    pub memo: Memo,
    pub success: bool,
}

impl From<RecvEvent> for ModuleEvent {
    fn from(ev: RecvEvent) -> Self {
        let RecvEvent {
            sender,
            receiver,
            denom,
            amount,
            memo,
            success,
        } = ev;
        Self {
            kind: EVENT_TYPE_PACKET.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("sender", sender).into(),
                ("receiver", receiver).into(),
                ("denom", denom).into(),
                ("amount", amount).into(),
                ("memo", memo).into(),
                ("success", success).into(),
            ],
        }
    }
}

/// Event emitted in the `onAcknowledgePacket` callback
pub struct AckEvent {
    pub sender: Signer,
    pub receiver: Signer,
    pub denom: Denom,
    pub amount: Amount,
    pub acknowledgement: AcknowledgementStatus,
}

impl From<AckEvent> for ModuleEvent {
    fn from(ev: AckEvent) -> Self {
        let AckEvent {
            sender,
            receiver,
            denom,
            amount,
            acknowledgement,
        } = ev;
        Self {
            kind: EVENT_TYPE_PACKET.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("sender", sender).into(),
                ("receiver", receiver).into(),
                ("denom", denom).into(),
                ("amount", amount).into(),
                ("acknowledgement", acknowledgement).into(),
            ],
        }
    }
}

/// Event emitted in the `onAcknowledgePacket` callback to indicate
/// whether the acknowledgement is a success or a failure
pub struct AckStatusEvent {
    pub acknowledgement: AcknowledgementStatus,
}

impl From<AckStatusEvent> for ModuleEvent {
    fn from(ev: AckStatusEvent) -> Self {
        let AckStatusEvent { acknowledgement } = ev;
        let attr_label = match acknowledgement {
            AcknowledgementStatus::Success(_) => "success",
            AcknowledgementStatus::Error(_) => "error",
        };

        Self {
            kind: EVENT_TYPE_PACKET.to_string(),
            attributes: vec![(attr_label, acknowledgement.to_string()).into()],
        }
    }
}

/// Event emitted in the `onTimeoutPacket` callback
pub struct TimeoutEvent {
    pub refund_receiver: Signer,
    pub refund_denom: Denom,
    pub refund_amount: Amount,
}

impl From<TimeoutEvent> for ModuleEvent {
    fn from(ev: TimeoutEvent) -> Self {
        let TimeoutEvent {
            refund_receiver,
            refund_denom,
            refund_amount,
        } = ev;
        Self {
            kind: EVENT_TYPE_TIMEOUT.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("refund_receiver", refund_receiver).into(),
                ("refund_denom", refund_denom).into(),
                ("refund_amount", refund_amount).into(),
            ],
        }
    }
}

/// Event emitted for every in-flight packet refunded when its channel closes
pub struct ChannelRefundEvent {
    pub channel_id: ChannelId,
    pub sequence: Sequence,
    pub refund_receiver: Signer,
    pub refund_denom: Denom,
    pub refund_amount: Amount,
}

impl From<ChannelRefundEvent> for ModuleEvent {
    fn from(ev: ChannelRefundEvent) -> Self {
        let ChannelRefundEvent {
            channel_id,
            sequence,
            refund_receiver,
            refund_denom,
            refund_amount,
        } = ev;
        Self {
            kind: EVENT_TYPE_CHANNEL_REFUND.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("channel_id", channel_id).into(),
                ("sequence", sequence).into(),
                ("refund_receiver", refund_receiver).into(),
                ("refund_denom", refund_denom).into(),
                ("refund_amount", refund_amount).into(),
            ],
        }
    }
}

/// Event emitted when an acknowledgement or timeout arrives for a packet
/// that was already resolved
pub struct DuplicateResolutionEvent {
    pub channel_id: ChannelId,
    pub sequence: Sequence,
    pub status: PacketStatus,
}

impl From<DuplicateResolutionEvent> for ModuleEvent {
    fn from(ev: DuplicateResolutionEvent) -> Self {
        let DuplicateResolutionEvent {
            channel_id,
            sequence,
            status,
        } = ev;
        Self {
            kind: EVENT_TYPE_DUPLICATE_RESOLUTION.to_string(),
            attributes: vec![
                ("module", MODULE_ID_STR).into(),
                ("channel_id", channel_id).into(),
                ("sequence", sequence).into(),
                ("status", status).into(),
            ],
        }
    }
}

impl From<Event> for ModuleEvent {
    fn from(ev: Event) -> Self {
        match ev {
            Event::Transfer(ev) => ev.into(),
            Event::Recv(ev) => ev.into(),
            Event::Ack(ev) => ev.into(),
            Event::AckStatus(ev) => ev.into(),
            Event::Timeout(ev) => ev.into(),
            Event::ChannelRefund(ev) => ev.into(),
            Event::DuplicateResolution(ev) => ev.into(),
        }
    }
}

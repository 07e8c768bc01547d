use cht_reward_types::error::RewardError;
use cht_reward_types::events::{
    AckEvent, AckStatusEvent, DuplicateResolutionEvent, TimeoutEvent,
};
use cht_reward_types::{PacketRecord, PacketStatus};
use ibc_core::channel::types::acknowledgement::AcknowledgementStatus;
use ibc_core::channel::types::packet::Packet;
use ibc_core::primitives::prelude::*;
use ibc_core::router::types::module::ModuleExtras;

use crate::capability::channel_capability;
use crate::context::{RewardExecutionContext, RewardValidationContext};
use crate::escrow::{finalize_execute, finalize_validate, reverse_execute, reverse_validate};

/// How a sent packet ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PacketOutcome {
    Acknowledged(AcknowledgementStatus),
    TimedOut,
}

impl PacketOutcome {
    /// The resolution marker recorded for the packet.
    pub fn status(&self) -> PacketStatus {
        match self {
            Self::Acknowledged(ack) if ack.is_successful() => PacketStatus::AckedSuccess,
            Self::Acknowledged(_) => PacketStatus::AckedFailure,
            Self::TimedOut => PacketStatus::TimedOut,
        }
    }
}

/// Looks up the record of the packet, authenticating the source channel on
/// the way.
fn sent_packet_record(
    ctx_a: &impl RewardValidationContext,
    packet: &Packet,
) -> Result<PacketRecord, RewardError> {
    channel_capability(ctx_a, &packet.port_id_on_a, &packet.chan_id_on_a)?;

    let record = ctx_a
        .packet_record(&packet.port_id_on_a, &packet.chan_id_on_a, &packet.seq_on_a)
        .ok_or_else(|| RewardError::PacketNotFound {
            port_id: packet.port_id_on_a.clone(),
            channel_id: packet.chan_id_on_a.clone(),
            sequence: packet.seq_on_a,
        })?;

    if record.status == PacketStatus::PendingSend {
        return Err(RewardError::PacketNotResolvable {
            sequence: packet.seq_on_a,
            status: record.status,
        });
    }

    Ok(record)
}

pub fn resolve_packet_validate(
    ctx_a: &impl RewardValidationContext,
    packet: &Packet,
    outcome: &PacketOutcome,
) -> Result<(), RewardError> {
    let record = sent_packet_record(ctx_a, packet)?;

    if record.status.is_resolved() {
        return Ok(());
    }

    match outcome.status() {
        PacketStatus::AckedSuccess => {
            finalize_validate(ctx_a, &packet.port_id_on_a, &packet.chan_id_on_a, &record.coin)
        }
        _ => reverse_validate(ctx_a, &packet.port_id_on_a, &packet.chan_id_on_a, &record.coin),
    }
}

/// Applies the outcome of a sent packet exactly once: a successful
/// acknowledgement finalizes the escrow, anything else reverses it.
///
/// Outcomes reported for an already resolved packet change nothing.
pub fn resolve_packet_execute(
    ctx_a: &mut impl RewardExecutionContext,
    packet: &Packet,
    outcome: PacketOutcome,
) -> Result<ModuleExtras, RewardError> {
    let record = sent_packet_record(ctx_a, packet)?;

    if record.status.is_resolved() {
        let duplicate_event = DuplicateResolutionEvent {
            channel_id: packet.chan_id_on_a.clone(),
            sequence: packet.seq_on_a,
            status: record.status,
        };
        return Ok(ModuleExtras {
            events: vec![duplicate_event.into()],
            log: vec![format!(
                "ignoring {} for packet {} on {}: already {}",
                outcome.status(),
                packet.seq_on_a,
                packet.chan_id_on_a,
                record.status
            )],
        });
    }

    let status = outcome.status();
    match status {
        PacketStatus::AckedSuccess => {
            finalize_execute(ctx_a, &packet.port_id_on_a, &packet.chan_id_on_a, &record.coin)?
        }
        _ => reverse_execute(
            ctx_a,
            &packet.port_id_on_a,
            &packet.chan_id_on_a,
            &record.sender,
            &record.coin,
        )?,
    }

    ctx_a.store_packet_record(
        &packet.port_id_on_a,
        &packet.chan_id_on_a,
        packet.seq_on_a,
        record.clone().with_status(status),
    )?;

    let log = vec![format!(
        "packet {} on {} resolved as {status}: {}",
        packet.seq_on_a, packet.chan_id_on_a, record.coin
    )];

    let events = match outcome {
        PacketOutcome::Acknowledged(acknowledgement) => {
            let ack_event = AckEvent {
                sender: record.sender,
                receiver: record.receiver,
                denom: record.coin.denom,
                amount: record.coin.amount,
                acknowledgement: acknowledgement.clone(),
            };
            vec![ack_event.into(), AckStatusEvent { acknowledgement }.into()]
        }
        PacketOutcome::TimedOut => {
            let timeout_event = TimeoutEvent {
                refund_receiver: record.sender,
                refund_denom: record.coin.denom,
                refund_amount: record.coin.amount,
            };
            vec![timeout_event.into()]
        }
    };

    Ok(ModuleExtras { events, log })
}

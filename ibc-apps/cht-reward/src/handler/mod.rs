//! Implements the processing logic of the reward application's messages and
//! packet callbacks.
mod close_channel;
mod on_recv_packet;
mod on_resolve_packet;
mod send_transfer;

pub use close_channel::*;
pub use on_recv_packet::*;
pub use on_resolve_packet::*;
pub use send_transfer::*;

use cht_reward_types::error::RewardError;
use cht_reward_types::events::ChannelRefundEvent;
use cht_reward_types::{HandshakeState, PacketStatus};
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::router::types::module::ModuleExtras;

use crate::capability::channel_capability;
use crate::context::{RewardExecutionContext, RewardValidationContext};
use crate::escrow::{reverse_execute, reverse_validate};

pub fn close_channel_records_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), RewardError> {
    let record =
        ctx.channel_record(port_id, channel_id)
            .ok_or_else(|| RewardError::ChannelNotOpen {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            })?;

    if record.state == HandshakeState::Closed {
        return Err(RewardError::InvalidHandshakeState {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            state: record.state,
            expected: "not CLOSED".to_string(),
        });
    }

    // A channel still in its handshake owns no claimed capability yet.
    if record.is_open() {
        channel_capability(ctx, port_id, channel_id)?;
    }

    for (_, packet) in ctx.packet_records(port_id, channel_id) {
        if !packet.status.is_resolved() {
            reverse_validate(ctx, port_id, channel_id, &packet.coin)?;
        }
    }

    Ok(())
}

/// Marks the channel closed and refunds every packet still in flight on it,
/// since no acknowledgement can arrive anymore.
pub fn close_channel_records_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<ModuleExtras, RewardError> {
    let mut record =
        ctx.channel_record(port_id, channel_id)
            .ok_or_else(|| RewardError::ChannelNotOpen {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            })?;

    if record.is_open() {
        channel_capability(ctx, port_id, channel_id)?;
    }

    let mut extras = ModuleExtras::empty();

    // An unfinished handshake leaves an issued but unclaimed capability behind.
    if let Some(capability) = record.pending_capability.take() {
        ctx.release_capability(&capability)?;
    }
    record.state = HandshakeState::Closed;
    ctx.store_channel_record(port_id, channel_id, record)?;
    extras.log.push(format!("channel {channel_id} on port {port_id} closed"));

    for (sequence, packet) in ctx.packet_records(port_id, channel_id) {
        if packet.status.is_resolved() {
            continue;
        }

        reverse_execute(ctx, port_id, channel_id, &packet.sender, &packet.coin)?;
        ctx.store_packet_record(
            port_id,
            channel_id,
            sequence,
            packet.clone().with_status(PacketStatus::RefundedOnClose),
        )?;

        extras.log.push(format!(
            "refunded {} to {} for packet {sequence} on closed channel {channel_id}",
            packet.coin, packet.sender
        ));
        let refund_event = ChannelRefundEvent {
            channel_id: channel_id.clone(),
            sequence,
            refund_receiver: packet.sender,
            refund_denom: packet.coin.denom,
            refund_amount: packet.coin.amount,
        };
        extras.events.push(refund_event.into());
    }

    Ok(extras)
}

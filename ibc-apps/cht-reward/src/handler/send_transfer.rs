use cht_reward_types::error::RewardError;
use cht_reward_types::events::TransferEvent;
use cht_reward_types::msgs::MsgRewardTransfer;
use cht_reward_types::packet::{packet_validators, RewardPacketData};
use cht_reward_types::{PacketRecord, PacketStatus};
use ibc_core::channel::types::channel::State;
use ibc_core::channel::types::packet::Packet;
use ibc_core::channel::types::timeout::TimeoutHeight;
use ibc_core::primitives::prelude::*;
use ibc_core::router::types::event::ModuleEvent;

use crate::capability::channel_capability;
use crate::context::{RewardExecutionContext, RewardValidationContext};
use crate::escrow::{debit_execute, debit_validate, reverse_execute};
use crate::snapshot::build_snapshot;

/// Initiate a reward transfer. Equivalent to calling [`send_transfer_validate`],
/// followed by [`send_transfer_execute`].
pub fn send_transfer(
    ctx_a: &mut impl RewardExecutionContext,
    msg: MsgRewardTransfer,
) -> Result<Packet, RewardError> {
    send_transfer_validate(ctx_a, &msg)?;
    send_transfer_execute(ctx_a, msg)
}

/// Validates the reward transfer. If this succeeds, then it is legal to
/// initiate the transfer with [`send_transfer_execute`].
pub fn send_transfer_validate(
    ctx_a: &impl RewardValidationContext,
    msg: &MsgRewardTransfer,
) -> Result<(), RewardError> {
    msg.validate_basic()?;

    let (packet, data) = build_packet(ctx_a, msg)?;
    let coin = data.coin()?;

    validate_timeouts(ctx_a, msg, &packet)?;

    debit_validate(
        ctx_a,
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        &msg.delegator,
        &coin,
    )?;

    Ok(())
}

/// Executes the reward transfer. A prior call to [`send_transfer_validate`]
/// MUST have succeeded.
///
/// Returns the committed packet.
pub fn send_transfer_execute(
    ctx_a: &mut impl RewardExecutionContext,
    msg: MsgRewardTransfer,
) -> Result<Packet, RewardError> {
    let capability = channel_capability(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;
    let (packet, data) = build_packet(ctx_a, &msg)?;
    let coin = data.coin()?;

    debit_execute(
        ctx_a,
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        &msg.delegator,
        &coin,
    )?;

    let record = PacketRecord {
        sender: msg.delegator.clone(),
        receiver: msg.receiver.clone(),
        coin: coin.clone(),
        status: PacketStatus::PendingSend,
    };
    ctx_a.store_packet_record(
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        packet.seq_on_a,
        record.clone(),
    )?;

    if let Err(err) = ctx_a.send_packet(&capability, packet.clone()) {
        // The debit must not outlive a packet that was never committed.
        reverse_execute(
            ctx_a,
            &msg.port_id_on_a,
            &msg.chan_id_on_a,
            &msg.delegator,
            &coin,
        )?;
        ctx_a.delete_packet_record(&msg.port_id_on_a, &msg.chan_id_on_a, &packet.seq_on_a)?;
        return Err(err);
    }

    ctx_a.store_packet_record(
        &msg.port_id_on_a,
        &msg.chan_id_on_a,
        packet.seq_on_a,
        record.with_status(PacketStatus::Sent),
    )?;

    {
        ctx_a.log_message(format!(
            "cht reward transfer: {} --({}, seq {})--> {}",
            msg.delegator, coin, packet.seq_on_a, msg.receiver
        ))?;

        let transfer_event = TransferEvent {
            sender: msg.delegator,
            receiver: msg.receiver,
            denom: coin.denom,
            amount: coin.amount,
            validators: packet_validators(&data),
            memo: msg.memo,
        };
        ctx_a.emit_event(ModuleEvent::from(transfer_event))?;
    }

    Ok(packet)
}

/// Snapshots the delegator's rewards and wraps them into the packet that the
/// message would commit, checking the channel along the way.
fn build_packet(
    ctx_a: &impl RewardValidationContext,
    msg: &MsgRewardTransfer,
) -> Result<(Packet, RewardPacketData), RewardError> {
    let is_open = ctx_a
        .channel_record(&msg.port_id_on_a, &msg.chan_id_on_a)
        .is_some_and(|record| record.is_open());
    if !is_open {
        return Err(RewardError::ChannelNotOpen {
            port_id: msg.port_id_on_a.clone(),
            channel_id: msg.chan_id_on_a.clone(),
        });
    }

    channel_capability(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;

    let chan_end_on_a = ctx_a.channel_end(&msg.port_id_on_a, &msg.chan_id_on_a)?;
    if chan_end_on_a.state() != &State::Open {
        return Err(RewardError::ChannelNotOpen {
            port_id: msg.port_id_on_a.clone(),
            channel_id: msg.chan_id_on_a.clone(),
        });
    }

    let port_id_on_b = chan_end_on_a.counterparty().port_id().clone();
    let chan_id_on_b = chan_end_on_a
        .counterparty()
        .channel_id()
        .ok_or_else(|| RewardError::DestinationChannelNotFound {
            port_id: msg.port_id_on_a.clone(),
            channel_id: msg.chan_id_on_a.clone(),
        })?
        .clone();

    let sequence = ctx_a.next_sequence_send(&msg.port_id_on_a, &msg.chan_id_on_a)?;

    let snapshot = build_snapshot(ctx_a, &msg.delegator, ctx_a.host_height())?;

    let data = RewardPacketData {
        snapshot,
        receiver: msg.receiver.clone(),
        memo: msg.memo.clone(),
    };

    let packet = Packet {
        seq_on_a: sequence,
        port_id_on_a: msg.port_id_on_a.clone(),
        chan_id_on_a: msg.chan_id_on_a.clone(),
        port_id_on_b,
        chan_id_on_b,
        data: serde_json::to_vec(&data).map_err(RewardError::host)?,
        timeout_height_on_b: msg.timeout_height_on_b,
        timeout_timestamp_on_b: msg.timeout_timestamp_on_b,
    };

    Ok((packet, data))
}

/// Rejects timeouts that the counterparty chain, as seen by our client of it,
/// has already passed.
fn validate_timeouts(
    ctx_a: &impl RewardValidationContext,
    msg: &MsgRewardTransfer,
    packet: &Packet,
) -> Result<(), RewardError> {
    let chan_end_on_a = ctx_a.channel_end(&msg.port_id_on_a, &msg.chan_id_on_a)?;
    let conn_id_on_a = chan_end_on_a.connection_hops().first().ok_or_else(|| {
        RewardError::MissingConnectionHops {
            port_id: msg.port_id_on_a.clone(),
            channel_id: msg.chan_id_on_a.clone(),
        }
    })?;

    let client_id_on_a = ctx_a.connection_client_id(conn_id_on_a)?;
    let latest_height_on_a = ctx_a.client_latest_height(&client_id_on_a)?;

    if let TimeoutHeight::At(timeout_height) = packet.timeout_height_on_b {
        if timeout_height <= latest_height_on_a {
            return Err(RewardError::TimeoutHeightElapsed {
                timeout_height,
                latest_height: latest_height_on_a,
            });
        }
    }

    let timeout_timestamp = packet.timeout_timestamp_on_b.nanoseconds();
    if timeout_timestamp != 0 {
        let latest_timestamp = ctx_a
            .client_consensus_timestamp(&client_id_on_a, &latest_height_on_a)?
            .nanoseconds();
        if timeout_timestamp <= latest_timestamp {
            return Err(RewardError::TimeoutTimestampElapsed {
                timeout_timestamp,
                latest_timestamp,
            });
        }
    }

    Ok(())
}

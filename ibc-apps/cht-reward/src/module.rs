//! Channel handshake and packet callbacks of the reward application.
use cht_reward_types::error::RewardError;
use cht_reward_types::events::RecvEvent;
use cht_reward_types::packet::RewardPacketData;
use cht_reward_types::{ack_success_b64, ChannelRecord, HandshakeState};
use ibc_core::channel::types::acknowledgement::{Acknowledgement, AcknowledgementStatus};
use ibc_core::channel::types::channel::{Counterparty, Order};
use ibc_core::channel::types::packet::Packet;
use ibc_core::channel::types::Version;
use ibc_core::host::types::identifiers::{ChannelId, ConnectionId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;
use ibc_core::router::types::module::ModuleExtras;

use crate::capability::{
    authenticate_port, channel_capability, claim_channel_capability,
    claim_channel_capability_validate, issue_channel_capability,
};
use crate::context::{RewardExecutionContext, RewardValidationContext};
use crate::handler::{
    close_channel_records_execute, close_channel_records_validate, process_recv_packet_execute,
    resolve_packet_execute, resolve_packet_validate, PacketOutcome,
};

fn verify_order(ctx: &impl RewardValidationContext, order: Order) -> Result<(), RewardError> {
    let expect_order = ctx.params().ordering;
    if order != expect_order {
        return Err(RewardError::InvalidChannelOrder {
            expect_order,
            got_order: order,
        });
    }
    Ok(())
}

fn verify_version(ctx: &impl RewardValidationContext, version: &Version) -> Result<(), RewardError> {
    let expected = ctx.params().version;
    if version != &expected {
        return Err(RewardError::UnsupportedVersion {
            expected,
            actual: version.clone(),
        });
    }
    Ok(())
}

fn invalid_state(
    port_id: &PortId,
    channel_id: &ChannelId,
    state: HandshakeState,
    expected: &str,
) -> RewardError {
    RewardError::InvalidHandshakeState {
        port_id: port_id.clone(),
        channel_id: channel_id.clone(),
        state,
        expected: expected.to_string(),
    }
}

pub fn on_chan_open_init_validate(
    ctx: &impl RewardValidationContext,
    order: Order,
    _connection_hops: &[ConnectionId],
    port_id: &PortId,
    channel_id: &ChannelId,
    _counterparty: &Counterparty,
    version: &Version,
) -> Result<(), RewardError> {
    authenticate_port(ctx, port_id)?;
    verify_order(ctx, order)?;

    if !version.is_empty() {
        verify_version(ctx, version)?;
    }

    if let Some(record) = ctx.channel_record(port_id, channel_id) {
        return Err(invalid_state(port_id, channel_id, record.state, "UNINITIALIZED"));
    }

    Ok(())
}

pub fn on_chan_open_init_execute(
    ctx: &mut impl RewardExecutionContext,
    order: Order,
    _connection_hops: &[ConnectionId],
    port_id: &PortId,
    channel_id: &ChannelId,
    _counterparty: &Counterparty,
    _version: &Version,
) -> Result<(ModuleExtras, Version), RewardError> {
    let version = ctx.params().version;
    let capability = issue_channel_capability(ctx, port_id, channel_id)?;

    ctx.store_channel_record(
        port_id,
        channel_id,
        ChannelRecord {
            state: HandshakeState::Init,
            version: version.clone(),
            ordering: order,
            pending_capability: Some(capability),
        },
    )?;

    let extras = ModuleExtras {
        events: Vec::new(),
        log: vec![format!(
            "channel {channel_id} on port {port_id} entered INIT with version {version}"
        )],
    };

    Ok((extras, version))
}

pub fn on_chan_open_try_validate(
    ctx: &impl RewardValidationContext,
    order: Order,
    _connection_hops: &[ConnectionId],
    port_id: &PortId,
    channel_id: &ChannelId,
    _counterparty: &Counterparty,
    counterparty_version: &Version,
) -> Result<(), RewardError> {
    authenticate_port(ctx, port_id)?;
    verify_order(ctx, order)?;
    verify_version(ctx, counterparty_version)?;

    match ctx.channel_record(port_id, channel_id) {
        None => Ok(()),
        // crossing hellos
        Some(record) if record.state == HandshakeState::Init => Ok(()),
        Some(record) => Err(invalid_state(
            port_id,
            channel_id,
            record.state,
            "UNINITIALIZED or INIT",
        )),
    }
}

pub fn on_chan_open_try_execute(
    ctx: &mut impl RewardExecutionContext,
    order: Order,
    _connection_hops: &[ConnectionId],
    port_id: &PortId,
    channel_id: &ChannelId,
    _counterparty: &Counterparty,
    _counterparty_version: &Version,
) -> Result<(ModuleExtras, Version), RewardError> {
    let version = ctx.params().version;

    let pending = ctx
        .channel_record(port_id, channel_id)
        .and_then(|record| record.pending_capability);
    let capability = match pending {
        Some(capability) => capability,
        None => issue_channel_capability(ctx, port_id, channel_id)?,
    };

    ctx.store_channel_record(
        port_id,
        channel_id,
        ChannelRecord {
            state: HandshakeState::TryOpen,
            version: version.clone(),
            ordering: order,
            pending_capability: Some(capability),
        },
    )?;

    let extras = ModuleExtras {
        events: Vec::new(),
        log: vec![format!(
            "channel {channel_id} on port {port_id} entered TRYOPEN with version {version}"
        )],
    };

    Ok((extras, version))
}

/// Checks that the channel may complete its handshake from one of the
/// `allowed` states, claiming the capability it was issued.
fn open_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    allowed: &[HandshakeState],
    expected: &str,
) -> Result<(), RewardError> {
    let record = ctx
        .channel_record(port_id, channel_id)
        .ok_or_else(|| RewardError::ChannelNotOpen {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
        })?;

    if !allowed.contains(&record.state) || record.pending_capability.is_none() {
        return Err(invalid_state(port_id, channel_id, record.state, expected));
    }

    claim_channel_capability_validate(ctx, port_id, channel_id)
}

fn open_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<ModuleExtras, RewardError> {
    let mut record = ctx
        .channel_record(port_id, channel_id)
        .ok_or_else(|| RewardError::ChannelNotOpen {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
        })?;

    let capability = record
        .pending_capability
        .take()
        .ok_or_else(|| invalid_state(port_id, channel_id, record.state, "a pending capability"))?;
    claim_channel_capability(ctx, port_id, channel_id, &capability)?;

    record.state = HandshakeState::Open;
    ctx.store_channel_record(port_id, channel_id, record)?;

    Ok(ModuleExtras {
        events: Vec::new(),
        log: vec![format!("channel {channel_id} on port {port_id} is OPEN")],
    })
}

pub fn on_chan_open_ack_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    counterparty_version: &Version,
) -> Result<(), RewardError> {
    verify_version(ctx, counterparty_version)?;
    open_validate(
        ctx,
        port_id,
        channel_id,
        &[HandshakeState::Init, HandshakeState::TryOpen],
        "INIT or TRYOPEN",
    )
}

pub fn on_chan_open_ack_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    _counterparty_version: &Version,
) -> Result<ModuleExtras, RewardError> {
    open_execute(ctx, port_id, channel_id)
}

pub fn on_chan_open_confirm_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), RewardError> {
    open_validate(ctx, port_id, channel_id, &[HandshakeState::TryOpen], "TRYOPEN")
}

pub fn on_chan_open_confirm_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<ModuleExtras, RewardError> {
    open_execute(ctx, port_id, channel_id)
}

pub fn on_chan_close_init_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), RewardError> {
    close_channel_records_validate(ctx, port_id, channel_id)
}

pub fn on_chan_close_init_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<ModuleExtras, RewardError> {
    close_channel_records_execute(ctx, port_id, channel_id)
}

pub fn on_chan_close_confirm_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), RewardError> {
    close_channel_records_validate(ctx, port_id, channel_id)
}

pub fn on_chan_close_confirm_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<ModuleExtras, RewardError> {
    close_channel_records_execute(ctx, port_id, channel_id)
}

/// Receives a reward packet.
///
/// Returns `Err` only for faults of the channel itself: an unauthenticated
/// destination channel, a channel that is not open, or an out-of-order
/// sequence on an ordered channel. Every problem with the packet's content
/// becomes an error acknowledgement instead.
pub fn on_recv_packet_execute(
    ctx_b: &mut impl RewardExecutionContext,
    packet: &Packet,
) -> Result<(ModuleExtras, Acknowledgement), RewardError> {
    let port_id_on_b = &packet.port_id_on_b;
    let chan_id_on_b = &packet.chan_id_on_b;

    channel_capability(ctx_b, port_id_on_b, chan_id_on_b)?;

    let record = ctx_b
        .channel_record(port_id_on_b, chan_id_on_b)
        .filter(ChannelRecord::is_open)
        .ok_or_else(|| RewardError::ChannelNotOpen {
            port_id: port_id_on_b.clone(),
            channel_id: chan_id_on_b.clone(),
        })?;

    if record.ordering == Order::Ordered {
        let expected = ctx_b.next_sequence_recv(port_id_on_b, chan_id_on_b);
        if packet.seq_on_a != expected {
            return Err(RewardError::OutOfOrderPacket {
                port_id: port_id_on_b.clone(),
                channel_id: chan_id_on_b.clone(),
                expected,
                actual: packet.seq_on_a,
            });
        }
        ctx_b.store_next_sequence_recv(port_id_on_b, chan_id_on_b, expected.increment())?;
    }

    let Ok(data) = serde_json::from_slice::<RewardPacketData>(&packet.data) else {
        let ack = AcknowledgementStatus::error(RewardError::PacketDataDeserialization.into());
        return Ok((ModuleExtras::empty(), ack.into()));
    };

    let coin = match data.coin() {
        Ok(coin) => coin,
        Err(err) => {
            let ack = AcknowledgementStatus::error(err.into());
            return Ok((ModuleExtras::empty(), ack.into()));
        }
    };

    let (mut extras, ack) = match process_recv_packet_execute(ctx_b, packet, data.clone()) {
        Ok(extras) => (extras, AcknowledgementStatus::success(ack_success_b64())),
        Err((extras, error)) => (extras, AcknowledgementStatus::error(error.into())),
    };

    let recv_event = RecvEvent {
        sender: data.snapshot.delegator().clone(),
        receiver: data.receiver,
        denom: coin.denom,
        amount: coin.amount,
        memo: data.memo,
        success: ack.is_successful(),
    };
    extras.events.push(recv_event.into());

    Ok((extras, ack.into()))
}

pub fn on_acknowledgement_packet_validate<Ctx>(
    ctx: &Ctx,
    packet: &Packet,
    acknowledgement: &Acknowledgement,
    _relayer: &Signer,
) -> Result<(), RewardError>
where
    Ctx: RewardValidationContext,
{
    let acknowledgement = serde_json::from_slice::<AcknowledgementStatus>(acknowledgement.as_ref())
        .map_err(|_| RewardError::AckDeserialization)?;

    resolve_packet_validate(ctx, packet, &PacketOutcome::Acknowledged(acknowledgement))
}

pub fn on_acknowledgement_packet_execute(
    ctx: &mut impl RewardExecutionContext,
    packet: &Packet,
    acknowledgement: &Acknowledgement,
    _relayer: &Signer,
) -> (ModuleExtras, Result<(), RewardError>) {
    let Ok(acknowledgement) =
        serde_json::from_slice::<AcknowledgementStatus>(acknowledgement.as_ref())
    else {
        return (ModuleExtras::empty(), Err(RewardError::AckDeserialization));
    };

    match resolve_packet_execute(ctx, packet, PacketOutcome::Acknowledged(acknowledgement)) {
        Ok(extras) => (extras, Ok(())),
        Err(err) => (ModuleExtras::empty(), Err(err)),
    }
}

pub fn on_timeout_packet_validate<Ctx>(
    ctx: &Ctx,
    packet: &Packet,
    _relayer: &Signer,
) -> Result<(), RewardError>
where
    Ctx: RewardValidationContext,
{
    resolve_packet_validate(ctx, packet, &PacketOutcome::TimedOut)
}

pub fn on_timeout_packet_execute(
    ctx: &mut impl RewardExecutionContext,
    packet: &Packet,
    _relayer: &Signer,
) -> (ModuleExtras, Result<(), RewardError>) {
    match resolve_packet_execute(ctx, packet, PacketOutcome::TimedOut) {
        Ok(extras) => (extras, Ok(())),
        Err(err) => (ModuleExtras::empty(), Err(err)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ack_ser() {
        fn ser_json_assert_eq(ack: AcknowledgementStatus, json_str: &str) {
            let ser = serde_json::to_string(&ack).unwrap();
            assert_eq!(ser, json_str)
        }

        ser_json_assert_eq(
            AcknowledgementStatus::success(ack_success_b64()),
            r#"{"result":"AQ=="}"#,
        );
        ser_json_assert_eq(
            AcknowledgementStatus::error(RewardError::PacketDataDeserialization.into()),
            r#"{"error":"failed to deserialize packet data"}"#,
        );
    }

    #[test]
    fn test_ack_error_to_vec() {
        let ack_error: Vec<u8> = AcknowledgementStatus::error(
            RewardError::BlockedAddress {
                address: "cht1module".to_string(),
            }
            .into(),
        )
        .into();

        assert_eq!(
            ack_error,
            br#"{"error":"address `cht1module` is not allowed to receive funds"}"#
        );
    }

    #[test]
    fn test_ack_de() {
        let de = serde_json::from_str::<AcknowledgementStatus>(r#"{"result":"AQ=="}"#).unwrap();
        assert_eq!(de, AcknowledgementStatus::success(ack_success_b64()));

        assert!(serde_json::from_str::<AcknowledgementStatus>(r#"{"success":"AQ=="}"#).is_err());
    }

    #[test]
    fn test_packet_outcome_status() {
        use cht_reward_types::PacketStatus;

        let success = PacketOutcome::Acknowledged(AcknowledgementStatus::success(ack_success_b64()));
        let failure = PacketOutcome::Acknowledged(AcknowledgementStatus::error(
            RewardError::MissingTimeout.into(),
        ));

        assert_eq!(success.status(), PacketStatus::AckedSuccess);
        assert_eq!(failure.status(), PacketStatus::AckedFailure);
        assert_eq!(PacketOutcome::TimedOut.status(), PacketStatus::TimedOut);
    }
}

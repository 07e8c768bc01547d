//! Drives the core side of channel handshakes and packet relaying between
//! two mock chains, calling into each chain's reward module through the
//! router [`Module`] interface.
use cht_reward::context::RewardValidationContext;
use ibc_core::channel::types::acknowledgement::Acknowledgement;
use ibc_core::channel::types::channel::{ChannelEnd, Counterparty, Order, State};
use ibc_core::channel::types::error::{ChannelError, PacketError};
use ibc_core::channel::types::packet::Packet;
use ibc_core::channel::types::Version;
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;
use ibc_core::router::module::Module;
use ibc_core::router::types::module::ModuleExtras;

use crate::hosts::MockChain;
use crate::testapp::RewardModule;

pub type MockRewardModule = RewardModule<MockChain>;

/// Both ends of a channel between chain A and chain B.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelPair {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
    pub port_id_on_b: PortId,
    pub chan_id_on_b: ChannelId,
}

/// The account relaying on behalf of the tests.
pub fn relayer_signer() -> Signer {
    "relayer".to_string().into()
}

/// Records the events and logs a callback handed back, the way the core does.
pub fn apply_extras(chain: &mut MockChain, extras: ModuleExtras) {
    chain.events.extend(extras.events);
    chain.logs.extend(extras.log);
}

fn channel_end(
    chain: &MockChain,
    state: State,
    order: Order,
    counterparty: Counterparty,
    version: Version,
) -> Result<ChannelEnd, ChannelError> {
    ChannelEnd::new(
        state,
        order,
        counterparty,
        vec![chain.connection_id().clone()],
        version,
    )
}

/// Runs `ChanOpenInit` on A with the proposed `version`.
pub fn chan_open_init(
    a: &mut MockRewardModule,
    port_id_on_b: &PortId,
    order: Order,
    version: &Version,
) -> Result<(ChannelId, Version), ChannelError> {
    let port_id_on_a = a.ctx.bound_port().unwrap_or_else(|| a.ctx.reward_port_id());
    let chan_id_on_a = a.ctx.allocate_channel_id();
    let counterparty = Counterparty::new(port_id_on_b.clone(), None);
    let hops = [a.ctx.connection_id().clone()];

    a.on_chan_open_init_validate(
        order,
        &hops,
        &port_id_on_a,
        &chan_id_on_a,
        &counterparty,
        version,
    )?;
    let (extras, version_on_a) = a.on_chan_open_init_execute(
        order,
        &hops,
        &port_id_on_a,
        &chan_id_on_a,
        &counterparty,
        version,
    )?;
    apply_extras(&mut a.ctx, extras);

    let chan_end = channel_end(&a.ctx, State::Init, order, counterparty, version_on_a.clone())?;
    a.ctx.store_channel_end(&port_id_on_a, &chan_id_on_a, chan_end);

    Ok((chan_id_on_a, version_on_a))
}

/// Runs `ChanOpenTry` on B against A's channel.
pub fn chan_open_try(
    b: &mut MockRewardModule,
    port_id_on_a: &PortId,
    chan_id_on_a: &ChannelId,
    order: Order,
    version_on_a: &Version,
) -> Result<(ChannelId, Version), ChannelError> {
    let port_id_on_b = b.ctx.bound_port().unwrap_or_else(|| b.ctx.reward_port_id());
    let chan_id_on_b = b.ctx.allocate_channel_id();
    let counterparty = Counterparty::new(port_id_on_a.clone(), Some(chan_id_on_a.clone()));
    let hops = [b.ctx.connection_id().clone()];

    b.on_chan_open_try_validate(
        order,
        &hops,
        &port_id_on_b,
        &chan_id_on_b,
        &counterparty,
        version_on_a,
    )?;
    let (extras, version_on_b) = b.on_chan_open_try_execute(
        order,
        &hops,
        &port_id_on_b,
        &chan_id_on_b,
        &counterparty,
        version_on_a,
    )?;
    apply_extras(&mut b.ctx, extras);

    let chan_end = channel_end(&b.ctx, State::TryOpen, order, counterparty, version_on_b.clone())?;
    b.ctx.store_channel_end(&port_id_on_b, &chan_id_on_b, chan_end);

    Ok((chan_id_on_b, version_on_b))
}

/// Runs `ChanOpenAck` on A, opening its end.
pub fn chan_open_ack(
    a: &mut MockRewardModule,
    pair: &ChannelPair,
    order: Order,
    version_on_b: &Version,
) -> Result<(), ChannelError> {
    a.on_chan_open_ack_validate(&pair.port_id_on_a, &pair.chan_id_on_a, version_on_b)?;
    let extras =
        a.on_chan_open_ack_execute(&pair.port_id_on_a, &pair.chan_id_on_a, version_on_b)?;
    apply_extras(&mut a.ctx, extras);

    let counterparty = Counterparty::new(pair.port_id_on_b.clone(), Some(pair.chan_id_on_b.clone()));
    let chan_end = channel_end(&a.ctx, State::Open, order, counterparty, version_on_b.clone())?;
    a.ctx
        .store_channel_end(&pair.port_id_on_a, &pair.chan_id_on_a, chan_end);

    Ok(())
}

/// Runs `ChanOpenConfirm` on B, opening its end.
pub fn chan_open_confirm(
    b: &mut MockRewardModule,
    pair: &ChannelPair,
    order: Order,
    version: &Version,
) -> Result<(), ChannelError> {
    b.on_chan_open_confirm_validate(&pair.port_id_on_b, &pair.chan_id_on_b)?;
    let extras = b.on_chan_open_confirm_execute(&pair.port_id_on_b, &pair.chan_id_on_b)?;
    apply_extras(&mut b.ctx, extras);

    let counterparty = Counterparty::new(pair.port_id_on_a.clone(), Some(pair.chan_id_on_a.clone()));
    let chan_end = channel_end(&b.ctx, State::Open, order, counterparty, version.clone())?;
    b.ctx
        .store_channel_end(&pair.port_id_on_b, &pair.chan_id_on_b, chan_end);

    Ok(())
}

/// Runs the four-step handshake between A and B, whose reward ports must
/// already be bound.
pub fn open_channel(
    a: &mut MockRewardModule,
    b: &mut MockRewardModule,
    order: Order,
) -> Result<ChannelPair, ChannelError> {
    let port_id_on_b = b.ctx.bound_port().unwrap_or_else(|| b.ctx.reward_port_id());
    let proposed = a.ctx.params().version;

    let (chan_id_on_a, version_on_a) = chan_open_init(a, &port_id_on_b, order, &proposed)?;
    let port_id_on_a = a.ctx.bound_port().unwrap_or_else(|| a.ctx.reward_port_id());
    let (chan_id_on_b, version_on_b) =
        chan_open_try(b, &port_id_on_a, &chan_id_on_a, order, &version_on_a)?;

    let pair = ChannelPair {
        port_id_on_a,
        chan_id_on_a,
        port_id_on_b,
        chan_id_on_b,
    };

    chan_open_ack(a, &pair, order, &version_on_b)?;
    chan_open_confirm(b, &pair, order, &version_on_b)?;

    tracing::info!(
        target: "cht-reward-testkit",
        chan_a = %pair.chan_id_on_a,
        chan_b = %pair.chan_id_on_b,
        "channel open"
    );

    Ok(pair)
}

/// Delivers a committed packet to B and returns the acknowledgement B wrote.
pub fn relay_recv_packet(b: &mut MockRewardModule, packet: &Packet) -> Acknowledgement {
    let (extras, acknowledgement) = b.on_recv_packet_execute(packet, &relayer_signer());
    apply_extras(&mut b.ctx, extras);
    acknowledgement
}

/// Delivers B's acknowledgement of `packet` back to A.
pub fn relay_ack_packet(
    a: &mut MockRewardModule,
    packet: &Packet,
    acknowledgement: &Acknowledgement,
) -> Result<(), PacketError> {
    let relayer = relayer_signer();
    a.on_acknowledgement_packet_validate(packet, acknowledgement, &relayer)?;
    let (extras, res) = a.on_acknowledgement_packet_execute(packet, acknowledgement, &relayer);
    apply_extras(&mut a.ctx, extras);
    res?;

    a.ctx
        .clear_commitment(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a);
    Ok(())
}

/// Reports to A that `packet` timed out on B.
pub fn relay_timeout_packet(a: &mut MockRewardModule, packet: &Packet) -> Result<(), PacketError> {
    let relayer = relayer_signer();
    a.on_timeout_packet_validate(packet, &relayer)?;
    let (extras, res) = a.on_timeout_packet_execute(packet, &relayer);
    apply_extras(&mut a.ctx, extras);
    res?;

    a.ctx
        .clear_commitment(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a);
    Ok(())
}

/// Runs `ChanCloseConfirm` on B after A closed its end.
pub fn chan_close_confirm(b: &mut MockRewardModule, pair: &ChannelPair) -> Result<(), ChannelError> {
    b.on_chan_close_confirm_validate(&pair.port_id_on_b, &pair.chan_id_on_b)?;
    let extras = b.on_chan_close_confirm_execute(&pair.port_id_on_b, &pair.chan_id_on_b)?;
    apply_extras(&mut b.ctx, extras);

    let closed = b
        .ctx
        .stored_channel_end(&pair.port_id_on_b, &pair.chan_id_on_b)
        .map(|chan_end| {
            ChannelEnd::new(
                State::Closed,
                *chan_end.ordering(),
                chan_end.counterparty().clone(),
                chan_end.connection_hops().clone(),
                chan_end.version().clone(),
            )
        })
        .transpose()?;
    if let Some(closed) = closed {
        b.ctx
            .store_channel_end(&pair.port_id_on_b, &pair.chan_id_on_b, closed);
    }

    Ok(())
}

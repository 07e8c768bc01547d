use cht_reward::capability::{authenticate, bind_port, channel_capability};
use cht_reward::context::RewardValidationContext;
use cht_reward::handler::{close_channel, send_transfer};
use cht_reward::module::{
    on_chan_close_init_execute, on_chan_close_init_validate, on_chan_open_init_validate,
    on_recv_packet_execute, on_timeout_packet_validate,
};
use cht_reward_testkit::fixtures::{
    bond_coin, bond_denom, delegator, dummy_msg_reward_transfer,
    past_timeout_height, receiver, validator_alpha, validator_beta, DummyRewardTransfer,
    RewardChains, DELEGATOR_BALANCE,
};
use cht_reward_testkit::hosts::{MockChain, MockChainConfig, GENESIS_TIMESTAMP_NANOS};
use cht_reward_testkit::relayer::{
    chan_close_confirm, open_channel, relay_ack_packet, relay_recv_packet, relay_timeout_packet,
    relayer_signer,
};
use cht_reward_testkit::testapp::RewardModule;
use cht_reward_types::error::{ErrorKind, RewardError};
use cht_reward_types::events::{
    EVENT_TYPE_CHANNEL_REFUND, EVENT_TYPE_DUPLICATE_RESOLUTION, EVENT_TYPE_PACKET,
    EVENT_TYPE_TIMEOUT, EVENT_TYPE_TRANSFER,
};
use cht_reward_types::msgs::MsgCloseChannel;
use cht_reward_types::packet::RewardPacketData;
use cht_reward_types::{
    reward_port_id, Amount, Coin, EscrowPolicy, EscrowRecord, HandshakeState, PacketStatus,
    RewardParams, U256, VERSION,
};
use ibc_core::channel::types::acknowledgement::{
    Acknowledgement, AcknowledgementStatus, StatusValue,
};
use ibc_core::channel::types::channel::{Counterparty, Order};
use ibc_core::channel::types::packet::Packet;
use ibc_core::channel::types::timeout::TimeoutHeight;
use ibc_core::channel::types::Version;
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};
use rstest::rstest;
use test_log::test;

const REWARD_TOTAL: u64 = 150;

fn send(chains: &mut RewardChains) -> Packet {
    let msg = dummy_msg_reward_transfer(&chains.pair);
    send_transfer(&mut chains.a.ctx, msg).expect("reward transfer")
}

fn escrow_on_a(chains: &RewardChains) -> EscrowRecord {
    chains
        .a
        .ctx
        .escrow_of(&chains.pair.port_id_on_a, &chains.pair.chan_id_on_a, &bond_denom())
}

fn module_balance_on_a(chains: &RewardChains) -> Amount {
    chains.balance_on_a(&chains.a.ctx.module_account())
}

fn voucher_balance_on_b(chains: &RewardChains, account: &Signer) -> Amount {
    let voucher = bond_denom().voucher(&chains.pair.port_id_on_b, &chains.pair.chan_id_on_b);
    chains.b.ctx.balance_of(account, &voucher)
}

fn status_on_a(chains: &RewardChains, packet: &Packet) -> PacketStatus {
    chains
        .a
        .ctx
        .packet_record_of(&packet.port_id_on_a, &packet.chan_id_on_a, packet.seq_on_a)
        .expect("packet record")
        .status
}

fn decode_ack(acknowledgement: &Acknowledgement) -> AcknowledgementStatus {
    serde_json::from_slice(acknowledgement.as_ref()).expect("acknowledgement status")
}

fn error_ack() -> Acknowledgement {
    AcknowledgementStatus::error(StatusValue::new("rejected by counterparty").expect("non-empty"))
        .into()
}

/// Bind "cht-reward", open a channel negotiating "cht-1", relay the rewards
/// of a delegator with two validators and acknowledge them.
#[test]
fn reward_transfer_acknowledged_successfully_finalizes_escrow() {
    let mut chains = RewardChains::default();
    let pair = chains.pair.clone();

    assert_eq!(chains.a.ctx.bound_port(), Some(reward_port_id()));
    assert_eq!(pair.port_id_on_a.as_str(), "cht-reward");
    for (chain, port_id, channel_id) in [
        (&chains.a.ctx, &pair.port_id_on_a, &pair.chan_id_on_a),
        (&chains.b.ctx, &pair.port_id_on_b, &pair.chan_id_on_b),
    ] {
        let record = chain
            .channel_record_of(port_id, channel_id)
            .expect("channel record");
        assert_eq!(record.state, HandshakeState::Open);
        assert_eq!(record.version, Version::new(VERSION.to_string()));
        assert!(record.pending_capability.is_none());
        assert!(channel_capability(chain, port_id, channel_id).is_ok());
    }

    let packet = send(&mut chains);

    assert_eq!(
        chains.balance_on_a(&delegator()),
        Amount::from(DELEGATOR_BALANCE - REWARD_TOTAL)
    );
    assert_eq!(escrow_on_a(&chains).in_flight, Amount::from(REWARD_TOTAL));
    assert_eq!(module_balance_on_a(&chains), Amount::from(REWARD_TOTAL));
    assert_eq!(status_on_a(&chains, &packet), PacketStatus::Sent);
    assert!(chains
        .a
        .ctx
        .commitment(&pair.port_id_on_a, &pair.chan_id_on_a, packet.seq_on_a)
        .is_some());
    assert_eq!(chains.a.ctx.events_of_kind(EVENT_TYPE_TRANSFER).len(), 1);

    let data: RewardPacketData = serde_json::from_slice(&packet.data).expect("packet data");
    let validators = data.snapshot.validators().cloned().collect::<Vec<_>>();
    assert_eq!(validators, vec![validator_alpha(), validator_beta()]);
    assert_eq!(data.coin().expect("coin"), bond_coin(REWARD_TOTAL));

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);
    assert!(decode_ack(&acknowledgement).is_successful());
    assert_eq!(voucher_balance_on_b(&chains, &receiver()), Amount::from(REWARD_TOTAL));
    assert!(chains.b.ctx.has_account_for(&receiver()));
    assert_eq!(
        chains
            .b
            .ctx
            .received_snapshot_of(&pair.port_id_on_b, &pair.chan_id_on_b, &delegator()),
        Some(&data.snapshot)
    );

    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("ack relayed");

    assert_eq!(escrow_on_a(&chains), EscrowRecord::default());
    assert_eq!(module_balance_on_a(&chains), Amount::zero());
    assert_eq!(
        chains.balance_on_a(&delegator()),
        Amount::from(DELEGATOR_BALANCE - REWARD_TOTAL)
    );
    assert_eq!(status_on_a(&chains, &packet), PacketStatus::AckedSuccess);
    assert!(chains
        .a
        .ctx
        .commitment(&pair.port_id_on_a, &pair.chan_id_on_a, packet.seq_on_a)
        .is_none());
    assert_eq!(chains.a.ctx.events_of_kind(EVENT_TYPE_PACKET).len(), 2);
}

#[rstest]
#[case::timeout(None)]
#[case::failure_ack(Some(error_ack()))]
fn unsuccessful_reward_transfer_restores_delegator(#[case] acknowledgement: Option<Acknowledgement>) {
    let mut chains = RewardChains::default();
    let packet = send(&mut chains);
    assert_eq!(escrow_on_a(&chains).in_flight, Amount::from(REWARD_TOTAL));

    match acknowledgement {
        Some(acknowledgement) => {
            relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("ack relayed");
            assert_eq!(status_on_a(&chains, &packet), PacketStatus::AckedFailure);
        }
        None => {
            relay_timeout_packet(&mut chains.a, &packet).expect("timeout relayed");
            assert_eq!(status_on_a(&chains, &packet), PacketStatus::TimedOut);
            assert_eq!(chains.a.ctx.events_of_kind(EVENT_TYPE_TIMEOUT).len(), 1);
        }
    }

    assert_eq!(chains.balance_on_a(&delegator()), Amount::from(DELEGATOR_BALANCE));
    assert_eq!(escrow_on_a(&chains), EscrowRecord::default());
    assert_eq!(module_balance_on_a(&chains), Amount::zero());
}

#[derive(Clone, Copy, Debug)]
enum Resolution {
    Success,
    Failure,
    Timeout,
}

fn resolve(chains: &mut RewardChains, packet: &Packet, resolution: Resolution) {
    match resolution {
        Resolution::Success => {
            let acknowledgement = relay_recv_packet(&mut chains.b, packet);
            relay_ack_packet(&mut chains.a, packet, &acknowledgement).expect("ack relayed")
        }
        Resolution::Failure => {
            relay_ack_packet(&mut chains.a, packet, &error_ack()).expect("ack relayed")
        }
        Resolution::Timeout => relay_timeout_packet(&mut chains.a, packet).expect("timeout relayed"),
    }
}

#[rstest]
#[case(Resolution::Success, Resolution::Failure)]
#[case(Resolution::Success, Resolution::Timeout)]
#[case(Resolution::Failure, Resolution::Failure)]
#[case(Resolution::Failure, Resolution::Timeout)]
#[case(Resolution::Timeout, Resolution::Timeout)]
#[case(Resolution::Timeout, Resolution::Failure)]
fn second_resolution_of_a_packet_is_ignored(
    #[case] first: Resolution,
    #[case] second: Resolution,
) {
    let mut chains = RewardChains::default();
    let packet = send(&mut chains);

    resolve(&mut chains, &packet, first);
    let status = status_on_a(&chains, &packet);
    let delegator_balance = chains.balance_on_a(&delegator());
    let fingerprint = chains.a.ctx.state_fingerprint();

    resolve(&mut chains, &packet, second);

    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
    assert_eq!(chains.balance_on_a(&delegator()), delegator_balance);
    assert_eq!(status_on_a(&chains, &packet), status);
    assert_eq!(
        chains.a.ctx.events_of_kind(EVENT_TYPE_DUPLICATE_RESOLUTION).len(),
        1
    );
}

#[test]
fn successful_ack_delivered_twice_is_ignored() {
    let mut chains = RewardChains::default();
    let packet = send(&mut chains);

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);
    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("ack relayed");
    let fingerprint = chains.a.ctx.state_fingerprint();

    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("duplicate");

    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
    assert_eq!(escrow_on_a(&chains), EscrowRecord::default());
}

#[test]
fn ordered_channel_rejects_out_of_order_receive() {
    let mut chains = RewardChains::open(RewardParams::default().with_ordering(Order::Ordered));
    let packets = (0..3).map(|_| send(&mut chains)).collect::<Vec<_>>();
    let fingerprint = chains.b.ctx.state_fingerprint();

    let err = on_recv_packet_execute(&mut chains.b.ctx, &packets[2])
        .expect_err("sequence 3 before sequence 1");
    assert!(matches!(err, RewardError::OutOfOrderPacket { .. }));
    assert_eq!(err.kind(), ErrorKind::ProtocolOrder);
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);

    for packet in &packets {
        let acknowledgement = relay_recv_packet(&mut chains.b, packet);
        assert!(decode_ack(&acknowledgement).is_successful());
    }
    assert_eq!(
        voucher_balance_on_b(&chains, &receiver()),
        Amount::from(3 * REWARD_TOTAL)
    );
}

#[test]
fn unordered_channel_accepts_gaps() {
    let mut chains = RewardChains::default();
    let packets = (0..3).map(|_| send(&mut chains)).collect::<Vec<_>>();

    let (_, acknowledgement) =
        on_recv_packet_execute(&mut chains.b.ctx, &packets[2]).expect("gaps are fine");
    assert!(decode_ack(&acknowledgement).is_successful());

    let acknowledgement = relay_recv_packet(&mut chains.b, &packets[0]);
    assert!(decode_ack(&acknowledgement).is_successful());

    assert_eq!(
        voucher_balance_on_b(&chains, &receiver()),
        Amount::from(2 * REWARD_TOTAL)
    );
}

#[test]
fn send_without_channel_capability_is_a_permission_error() {
    let mut chains = RewardChains::default();
    let pair = chains.pair.clone();
    chains
        .a
        .ctx
        .revoke_channel_capability(&pair.port_id_on_a, &pair.chan_id_on_a);
    let fingerprint = chains.a.ctx.state_fingerprint();

    let err = send_transfer(&mut chains.a.ctx, dummy_msg_reward_transfer(&pair))
        .expect_err("capability revoked");

    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
    assert_eq!(chains.balance_on_a(&delegator()), Amount::from(DELEGATOR_BALANCE));
}

#[test]
fn receive_without_channel_capability_is_a_permission_error() {
    let mut chains = RewardChains::default();
    let packet = send(&mut chains);
    let pair = chains.pair.clone();
    chains
        .b
        .ctx
        .revoke_channel_capability(&pair.port_id_on_b, &pair.chan_id_on_b);
    let fingerprint = chains.b.ctx.state_fingerprint();

    let err = on_recv_packet_execute(&mut chains.b.ctx, &packet).expect_err("capability revoked");

    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);
    assert_eq!(voucher_balance_on_b(&chains, &receiver()), Amount::zero());
}

#[test]
fn close_without_channel_capability_is_a_permission_error() {
    let mut chains = RewardChains::default();
    send(&mut chains);
    let pair = chains.pair.clone();
    chains
        .a
        .ctx
        .revoke_channel_capability(&pair.port_id_on_a, &pair.chan_id_on_a);
    let fingerprint = chains.a.ctx.state_fingerprint();

    let msg = MsgCloseChannel {
        port_id_on_a: pair.port_id_on_a.clone(),
        chan_id_on_a: pair.chan_id_on_a.clone(),
    };
    let err = close_channel(&mut chains.a.ctx, msg).expect_err("capability revoked");

    assert_eq!(err.kind(), ErrorKind::Permission);
    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
}

#[test]
fn close_callbacks_without_channel_capability_are_permission_errors() {
    let mut chains = RewardChains::default();
    send(&mut chains);
    let pair = chains.pair.clone();

    chains
        .a
        .ctx
        .revoke_channel_capability(&pair.port_id_on_a, &pair.chan_id_on_a);
    let fingerprint = chains.a.ctx.state_fingerprint();

    let err = on_chan_close_init_validate(&chains.a.ctx, &pair.port_id_on_a, &pair.chan_id_on_a)
        .expect_err("capability revoked");
    assert_eq!(err.kind(), ErrorKind::Permission);
    let err = on_chan_close_init_execute(&mut chains.a.ctx, &pair.port_id_on_a, &pair.chan_id_on_a)
        .expect_err("capability revoked");
    assert_eq!(err.kind(), ErrorKind::Permission);

    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
    assert_eq!(
        chains.balance_on_a(&delegator()),
        Amount::from(DELEGATOR_BALANCE - REWARD_TOTAL)
    );
    assert_eq!(escrow_on_a(&chains).in_flight, Amount::from(REWARD_TOTAL));

    chains
        .b
        .ctx
        .revoke_channel_capability(&pair.port_id_on_b, &pair.chan_id_on_b);
    let fingerprint = chains.b.ctx.state_fingerprint();

    assert!(chan_close_confirm(&mut chains.b, &pair).is_err());
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);
}

#[test]
fn capability_of_another_channel_does_not_authenticate() {
    let chains = RewardChains::default();
    let pair = &chains.pair;
    let capability =
        channel_capability(&chains.a.ctx, &pair.port_id_on_a, &pair.chan_id_on_a).expect("owned");

    assert!(authenticate(
        &chains.a.ctx,
        &pair.port_id_on_a,
        &pair.chan_id_on_a,
        &capability
    ));
    assert!(!authenticate(
        &chains.a.ctx,
        &pair.port_id_on_a,
        &ChannelId::new(7),
        &capability
    ));
    let other_port: PortId = "cht-other".parse().expect("valid port");
    assert!(!authenticate(
        &chains.a.ctx,
        &other_port,
        &pair.chan_id_on_a,
        &capability
    ));
}

#[test]
fn closing_a_channel_refunds_packets_in_flight() {
    let mut chains = RewardChains::default();
    let pair = chains.pair.clone();
    let in_flight = send(&mut chains);
    let acknowledged = send(&mut chains);
    let acknowledgement = relay_recv_packet(&mut chains.b, &acknowledged);
    relay_ack_packet(&mut chains.a, &acknowledged, &acknowledgement).expect("ack relayed");

    let msg = MsgCloseChannel {
        port_id_on_a: pair.port_id_on_a.clone(),
        chan_id_on_a: pair.chan_id_on_a.clone(),
    };
    close_channel(&mut chains.a.ctx, msg).expect("channel closed");

    assert_eq!(
        chains.balance_on_a(&delegator()),
        Amount::from(DELEGATOR_BALANCE - REWARD_TOTAL)
    );
    assert_eq!(escrow_on_a(&chains), EscrowRecord::default());
    assert_eq!(status_on_a(&chains, &in_flight), PacketStatus::RefundedOnClose);
    assert_eq!(status_on_a(&chains, &acknowledged), PacketStatus::AckedSuccess);
    assert_eq!(chains.a.ctx.events_of_kind(EVENT_TYPE_CHANNEL_REFUND).len(), 1);
    assert_eq!(
        chains
            .a
            .ctx
            .channel_record_of(&pair.port_id_on_a, &pair.chan_id_on_a)
            .map(|record| record.state),
        Some(HandshakeState::Closed)
    );

    chan_close_confirm(&mut chains.b, &pair).expect("close confirmed");
    assert_eq!(
        chains
            .b
            .ctx
            .channel_record_of(&pair.port_id_on_b, &pair.chan_id_on_b)
            .map(|record| record.state),
        Some(HandshakeState::Closed)
    );

    // a late timeout for the refunded packet changes nothing
    relay_timeout_packet(&mut chains.a, &in_flight).expect("duplicate");
    assert_eq!(
        chains.balance_on_a(&delegator()),
        Amount::from(DELEGATOR_BALANCE - REWARD_TOTAL)
    );
    assert_eq!(escrow_on_a(&chains), EscrowRecord::default());
    assert_eq!(status_on_a(&chains, &in_flight), PacketStatus::RefundedOnClose);
    assert_eq!(
        chains.a.ctx.events_of_kind(EVENT_TYPE_DUPLICATE_RESOLUTION).len(),
        1
    );

    let err = send_transfer(&mut chains.a.ctx, dummy_msg_reward_transfer(&pair))
        .expect_err("channel closed");
    assert!(matches!(err, RewardError::ChannelNotOpen { .. }));
}

#[test]
fn lock_policy_keeps_escrow_locked_after_success() {
    let mut chains =
        RewardChains::open(RewardParams::default().with_escrow_policy(EscrowPolicy::LockOnAck));
    let packet = send(&mut chains);

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);
    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("ack relayed");

    assert_eq!(
        escrow_on_a(&chains),
        EscrowRecord {
            in_flight: Amount::zero(),
            locked: Amount::from(REWARD_TOTAL),
        }
    );
    assert_eq!(module_balance_on_a(&chains), Amount::from(REWARD_TOTAL));
}

#[test]
fn malformed_payload_yields_error_ack_and_refund() {
    let mut chains = RewardChains::default();
    let mut packet = send(&mut chains);
    packet.data = b"{\"delegator\":".to_vec();
    let fingerprint = chains.b.ctx.state_fingerprint();

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);
    let status = decode_ack(&acknowledgement);

    assert!(!status.is_successful());
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);

    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("ack relayed");
    assert_eq!(chains.balance_on_a(&delegator()), Amount::from(DELEGATOR_BALANCE));
}

#[test]
fn blocked_receiver_yields_error_ack() {
    let mut chains = RewardChains::default();
    chains.b.ctx.block_address(&receiver());
    let packet = send(&mut chains);
    let fingerprint = chains.b.ctx.state_fingerprint();

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);

    assert!(!decode_ack(&acknowledgement).is_successful());
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);
}

#[test]
fn failed_receiver_credit_leaves_destination_untouched() {
    let mut chains = RewardChains::default();
    let packet = send(&mut chains);
    let voucher = bond_denom().voucher(&chains.pair.port_id_on_b, &chains.pair.chan_id_on_b);
    chains.b.ctx.fund(
        &receiver(),
        &Coin::new(voucher, Amount::from(U256::MAX - U256::from(10u64))),
    );
    let fingerprint = chains.b.ctx.state_fingerprint();

    let acknowledgement = relay_recv_packet(&mut chains.b, &packet);

    assert!(!decode_ack(&acknowledgement).is_successful());
    assert_eq!(chains.b.ctx.state_fingerprint(), fingerprint);

    relay_ack_packet(&mut chains.a, &packet, &acknowledgement).expect("error ack relayed");
    assert_eq!(chains.balance_on_a(&delegator()), Amount::from(DELEGATOR_BALANCE));
}

#[test]
fn mismatched_version_aborts_handshake() {
    let mut a = RewardModule::new(MockChain::default());
    let mut b = RewardModule::new(MockChain::new(
        MockChainConfig::builder()
            .chain_id("mockgaia-0")
            .params(RewardParams {
                version: Version::new("cht-2".to_string()),
                ..RewardParams::default()
            })
            .build(),
    ));
    bind_port(&mut a.ctx, &reward_port_id()).expect("port binding on A");
    bind_port(&mut b.ctx, &reward_port_id()).expect("port binding on B");

    assert!(open_channel(&mut a, &mut b, Order::Unordered).is_err());
    assert!(b
        .ctx
        .channel_record_of(&reward_port_id(), &ChannelId::new(0))
        .is_none());
}

#[rstest]
#[case::wrong_version(Order::Unordered, "ics20-1")]
#[case::wrong_order(Order::Ordered, VERSION)]
fn init_with_unexpected_parameters_is_rejected(#[case] order: Order, #[case] version: &str) {
    let mut chain = MockChain::default();
    bind_port(&mut chain, &reward_port_id()).expect("port binding");

    let res = on_chan_open_init_validate(
        &chain,
        order,
        &[chain.connection_id().clone()],
        &reward_port_id(),
        &ChannelId::new(0),
        &Counterparty::new(reward_port_id(), None),
        &Version::new(version.to_string()),
    );

    assert!(res.is_err());
}

#[test]
fn reentering_init_for_open_channel_is_rejected() {
    let chains = RewardChains::default();
    let pair = &chains.pair;

    let err = on_chan_open_init_validate(
        &chains.a.ctx,
        Order::Unordered,
        &[chains.a.ctx.connection_id().clone()],
        &pair.port_id_on_a,
        &pair.chan_id_on_a,
        &Counterparty::new(pair.port_id_on_b.clone(), None),
        &Version::new(VERSION.to_string()),
    )
    .expect_err("channel already open");

    assert!(matches!(err, RewardError::InvalidHandshakeState { .. }));
}

#[rstest]
#[case::past_height(past_timeout_height(), Timestamp::none())]
#[case::current_height(
    TimeoutHeight::At(ibc_core::client::types::Height::new(0, 10).expect("valid height")),
    Timestamp::none()
)]
#[case::past_timestamp(
    TimeoutHeight::Never,
    Timestamp::from_nanoseconds(GENESIS_TIMESTAMP_NANOS - 1).expect("valid timestamp")
)]
#[case::no_timeout(TimeoutHeight::Never, Timestamp::none())]
fn invalid_timeouts_are_rejected_before_any_debit(
    #[case] timeout_height_on_b: TimeoutHeight,
    #[case] timeout_timestamp_on_b: Timestamp,
) {
    let mut chains = RewardChains::default();
    let fingerprint = chains.a.ctx.state_fingerprint();
    let msg = DummyRewardTransfer::builder()
        .timeout_height_on_b(timeout_height_on_b)
        .timeout_timestamp_on_b(timeout_timestamp_on_b)
        .build()
        .msg(&chains.pair);

    let err = send_transfer(&mut chains.a.ctx, msg).expect_err("timeout not in the future");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
}

#[test]
fn future_timestamp_alone_is_accepted() {
    let mut chains = RewardChains::default();
    let msg = DummyRewardTransfer::builder()
        .timeout_height_on_b(TimeoutHeight::Never)
        .timeout_timestamp_on_b(
            Timestamp::from_nanoseconds(GENESIS_TIMESTAMP_NANOS + 1).expect("valid timestamp"),
        )
        .build()
        .msg(&chains.pair);

    assert!(send_transfer(&mut chains.a.ctx, msg).is_ok());
    assert_eq!(escrow_on_a(&chains).in_flight, Amount::from(REWARD_TOTAL));
}

#[test]
fn insufficient_balance_rejects_send_without_side_effects() {
    let mut chains = RewardChains::default();
    let poor: Signer = "cht1poor".to_string().into();
    chains
        .a
        .ctx
        .delegate(&poor, &validator_alpha(), 10u64, REWARD_TOTAL);
    chains.a.ctx.fund(&poor, &bond_coin(REWARD_TOTAL - 1));
    let fingerprint = chains.a.ctx.state_fingerprint();

    let msg = DummyRewardTransfer::builder()
        .delegator(poor)
        .build()
        .msg(&chains.pair);
    let err = send_transfer(&mut chains.a.ctx, msg).expect_err("balance too low");

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
}

#[rstest]
#[case::module_switch(false, false)]
#[case::denom_switch(true, true)]
fn disabled_sends_are_policy_blocked(#[case] send_enabled: bool, #[case] disable_denom: bool) {
    let params = RewardParams {
        send_enabled,
        ..RewardParams::default()
    };
    let mut chains = RewardChains::open(params);
    if disable_denom {
        chains.a.ctx.disable_send(&bond_denom());
    }
    let fingerprint = chains.a.ctx.state_fingerprint();

    let err = send_transfer(&mut chains.a.ctx, dummy_msg_reward_transfer(&chains.pair))
        .expect_err("sends disabled");

    assert_eq!(err.kind(), ErrorKind::PolicyBlocked);
    assert_eq!(chains.a.ctx.state_fingerprint(), fingerprint);
}

#[test]
fn delegator_without_delegations_is_not_found() {
    let mut chains = RewardChains::default();
    let msg = DummyRewardTransfer::builder()
        .delegator("cht1nobody".to_string().into())
        .build()
        .msg(&chains.pair);

    let err = send_transfer(&mut chains.a.ctx, msg).expect_err("no delegations");

    assert!(matches!(err, RewardError::NoDelegations { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn redelegating_validators_are_flagged_in_snapshot() {
    let mut chains = RewardChains::default();
    chains
        .a
        .ctx
        .start_redelegation(&delegator(), &validator_beta());

    let packet = send(&mut chains);
    let data: RewardPacketData = serde_json::from_slice(&packet.data).expect("packet data");
    let flags = data
        .snapshot
        .entries()
        .iter()
        .map(|entry| (entry.validator.clone(), entry.redelegating))
        .collect::<Vec<_>>();

    assert_eq!(
        flags,
        vec![(validator_alpha(), false), (validator_beta(), true)]
    );
}

#[rstest]
#[case::transfer_port("transfer", false, ErrorKind::PolicyBlocked)]
#[case::unconfigured_port("cht-reward-2", false, ErrorKind::Validation)]
#[case::second_binding("cht-reward", true, ErrorKind::Validation)]
#[case::second_port("cht-reward-2", true, ErrorKind::Validation)]
fn port_binding_is_exclusive(#[case] port: &str, #[case] bind_first: bool, #[case] kind: ErrorKind) {
    let mut chain = MockChain::default();
    if bind_first {
        bind_port(&mut chain, &reward_port_id()).expect("first binding");
    }
    let port_id: PortId = port.parse().expect("valid port");
    let fingerprint = chain.state_fingerprint();

    let err = bind_port(&mut chain, &port_id).expect_err("binding refused");

    assert_eq!(err.kind(), kind);
    assert_eq!(chain.state_fingerprint(), fingerprint);
}

#[test]
fn configured_port_other_than_the_default_binds() {
    let port_id: PortId = "cht-reward-2".parse().expect("valid port");
    let mut chain = MockChain::new(
        MockChainConfig::builder()
            .params(RewardParams {
                port_id: port_id.clone(),
                ..RewardParams::default()
            })
            .build(),
    );

    let err = bind_port(&mut chain, &reward_port_id()).expect_err("not the configured port");
    assert!(matches!(err, RewardError::InvalidPort { .. }));

    bind_port(&mut chain, &port_id).expect("configured port");
    assert_eq!(chain.bound_port(), Some(port_id));
}

#[test]
fn unknown_packet_resolution_is_not_found() {
    let mut chains = RewardChains::default();
    let mut packet = send(&mut chains);
    packet.seq_on_a = packet.seq_on_a.increment();

    let err = on_timeout_packet_validate(&chains.a.ctx, &packet, &relayer_signer())
        .expect_err("never sent");
    assert!(matches!(err, RewardError::PacketNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert!(relay_timeout_packet(&mut chains.a, &packet).is_err());
}

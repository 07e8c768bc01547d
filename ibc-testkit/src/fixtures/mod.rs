//! Ready-made accounts, delegations, messages and channel setups.
use cht_reward::capability::bind_port;
use cht_reward_types::msgs::MsgRewardTransfer;
use cht_reward_types::{
    Amount, Coin, Denom, Memo, RewardParams, ValidatorAddress, ValidatorInfo,
};
use ibc_core::channel::types::timeout::TimeoutHeight;
use ibc_core::client::types::Height;
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};
use typed_builder::TypedBuilder;

use crate::hosts::{MockChain, MockChainConfig};
use crate::relayer::{open_channel, ChannelPair, MockRewardModule};
use crate::testapp::RewardModule;

/// What the delegator holds before any reward leaves the chain.
pub const DELEGATOR_BALANCE: u64 = 1_000;

pub const ALPHA_REWARD: u64 = 100;

pub const BETA_REWARD: u64 = 50;

pub fn delegator() -> Signer {
    "cht1delegator".to_string().into()
}

pub fn receiver() -> Signer {
    "cosmos1receiver".to_string().into()
}

pub fn validator_alpha() -> ValidatorAddress {
    "chtvaloper1alpha".parse().expect("Never fails")
}

pub fn validator_beta() -> ValidatorAddress {
    "chtvaloper1beta".parse().expect("Never fails")
}

pub fn bond_denom() -> Denom {
    "ucht".parse().expect("Never fails")
}

pub fn bond_coin(amount: u64) -> Coin {
    Coin::new(bond_denom(), amount)
}

/// Gives [`delegator`] a balance of [`DELEGATOR_BALANCE`] and delegations to
/// two bonded validators with 100 and 50 units of rewards accrued.
pub fn with_delegator_rewards(chain: &mut MockChain) {
    for address in [validator_beta(), validator_alpha()] {
        chain.add_validator(ValidatorInfo {
            address,
            bonded: true,
            jailed: false,
        });
    }

    let delegator = delegator();
    chain.fund(&delegator, &bond_coin(DELEGATOR_BALANCE));
    // registered out of order on purpose; snapshots sort by validator
    chain.delegate(&delegator, &validator_beta(), 500u64, BETA_REWARD);
    chain.delegate(&delegator, &validator_alpha(), 1_000u64, ALPHA_REWARD);
}

/// A height the counterparty has not reached yet.
pub fn future_timeout_height() -> TimeoutHeight {
    TimeoutHeight::At(Height::new(0, 1_000).expect("Never fails"))
}

/// A height the counterparty already passed.
pub fn past_timeout_height() -> TimeoutHeight {
    TimeoutHeight::At(Height::new(0, 5).expect("Never fails"))
}

/// Parameters of a dummy [`MsgRewardTransfer`].
#[derive(Debug, TypedBuilder)]
pub struct DummyRewardTransfer {
    #[builder(default = delegator())]
    pub delegator: Signer,
    #[builder(default = receiver())]
    pub receiver: Signer,
    #[builder(default = Memo::from(""))]
    pub memo: Memo,
    #[builder(default = future_timeout_height())]
    pub timeout_height_on_b: TimeoutHeight,
    #[builder(default = Timestamp::none())]
    pub timeout_timestamp_on_b: Timestamp,
}

impl DummyRewardTransfer {
    /// Returns a dummy [`MsgRewardTransfer`] over chain A's end of `pair`,
    /// for testing purposes only!
    pub fn msg(self, pair: &ChannelPair) -> MsgRewardTransfer {
        MsgRewardTransfer {
            port_id_on_a: pair.port_id_on_a.clone(),
            chan_id_on_a: pair.chan_id_on_a.clone(),
            delegator: self.delegator,
            receiver: self.receiver,
            memo: self.memo,
            timeout_height_on_b: self.timeout_height_on_b,
            timeout_timestamp_on_b: self.timeout_timestamp_on_b,
        }
    }
}

/// Returns a dummy [`MsgRewardTransfer`] with default parameters, for
/// testing purposes only!
pub fn dummy_msg_reward_transfer(pair: &ChannelPair) -> MsgRewardTransfer {
    DummyRewardTransfer::builder().build().msg(pair)
}

/// Two chains whose reward modules bound their port and opened a channel to
/// each other.
#[derive(Debug)]
pub struct RewardChains {
    pub a: MockRewardModule,
    pub b: MockRewardModule,
    pub pair: ChannelPair,
}

impl RewardChains {
    /// Sets up chain A with [`with_delegator_rewards`] and chain B empty, both
    /// running under `params`.
    pub fn open(params: RewardParams) -> Self {
        let mut chain_a = MockChain::new(
            MockChainConfig::builder()
                .chain_id("mockcht-0")
                .params(params.clone())
                .build(),
        );
        with_delegator_rewards(&mut chain_a);

        let chain_b = MockChain::new(
            MockChainConfig::builder()
                .chain_id("mockgaia-0")
                .params(params.clone())
                .build(),
        );

        let mut a = RewardModule::new(chain_a);
        let mut b = RewardModule::new(chain_b);
        let port_id_on_a = a.ctx.reward_port_id();
        let port_id_on_b = b.ctx.reward_port_id();
        bind_port(&mut a.ctx, &port_id_on_a).expect("port binding on A");
        bind_port(&mut b.ctx, &port_id_on_b).expect("port binding on B");

        let pair = open_channel(&mut a, &mut b, params.ordering).expect("channel handshake");

        Self { a, b, pair }
    }

    /// Balance of `account` on chain A in the bond denom.
    pub fn balance_on_a(&self, account: &Signer) -> Amount {
        self.a.ctx.balance_of(account, &bond_denom())
    }
}

impl Default for RewardChains {
    fn default() -> Self {
        Self::open(RewardParams::default())
    }
}

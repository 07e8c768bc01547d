use alloc::collections::{BTreeMap, BTreeSet};

use cht_reward_types::{
    Amount, ChannelRecord, Coin, Delegation, Denom, EscrowRecord, PacketRecord,
    RewardParams, RewardSnapshot, ValidatorAddress, ValidatorInfo, MODULE_ACCOUNT_NAME,
};
use ibc_core::channel::types::channel::ChannelEnd;
use ibc_core::channel::types::packet::Packet;
use ibc_core::client::types::Height;
use ibc_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};
use ibc_core::router::types::event::ModuleEvent;
use typed_builder::TypedBuilder;

/// Port of the fungible token transfer application on every mock chain.
pub const TRANSFER_PORT_STR: &str = "transfer";

/// Nanoseconds of the counterparty consensus state a mock chain's client
/// starts at: 2023-01-01T00:00:00Z.
pub const GENESIS_TIMESTAMP_NANOS: u64 = 1_672_531_200_000_000_000;

/// Configuration of a [`MockChain`].
#[derive(Debug, TypedBuilder)]
pub struct MockChainConfig {
    #[builder(default = String::from("mockcht-0"), setter(into))]
    pub chain_id: String,
    #[builder(default)]
    pub params: RewardParams,
    #[builder(default = "ucht".parse().expect("Never fails"))]
    pub bond_denom: Denom,
    /// Height of the host chain, recorded in the snapshots it takes.
    #[builder(default = 1)]
    pub host_height: u64,
    /// Latest counterparty height known to the chain's client.
    #[builder(default = Height::new(0, 10).expect("Never fails"))]
    pub counterparty_height: Height,
    /// Consensus timestamp of the chain's client at `counterparty_height`.
    #[builder(default = Timestamp::from_nanoseconds(GENESIS_TIMESTAMP_NANOS).expect("Never fails"))]
    pub counterparty_timestamp: Timestamp,
}

impl Default for MockChainConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An in-memory host chain: bank, accounts, staking, distribution, the IBC
/// core keepers the reward application consumes, and the reward module's
/// own store.
///
/// Store keys are the string forms of identifiers.
#[derive(Debug)]
pub struct MockChain {
    pub chain_id: String,
    pub(crate) params: RewardParams,
    pub(crate) host_height: u64,

    // bank and accounts
    pub(crate) accounts: BTreeSet<String>,
    pub(crate) balances: BTreeMap<(String, Denom), Amount>,
    pub(crate) blocked: BTreeSet<String>,
    pub(crate) send_disabled: BTreeSet<Denom>,

    // staking and distribution
    pub(crate) bond_denom: Denom,
    pub(crate) validators: BTreeMap<ValidatorAddress, ValidatorInfo>,
    pub(crate) delegations: BTreeMap<String, Vec<Delegation>>,
    pub(crate) rewards: BTreeMap<(String, ValidatorAddress), Amount>,
    pub(crate) redelegations: BTreeSet<(String, ValidatorAddress)>,

    // ibc core
    pub(crate) connection_id: ConnectionId,
    pub(crate) client_id: ClientId,
    pub(crate) counterparty_height: Height,
    pub(crate) counterparty_timestamp: Timestamp,
    pub(crate) channel_ends: BTreeMap<(String, String), ChannelEnd>,
    pub(crate) next_channel: u64,
    pub(crate) next_sequence_send: BTreeMap<(String, String), Sequence>,
    pub(crate) commitments: BTreeMap<(String, String, u64), Packet>,
    pub(crate) bound_ports: BTreeSet<String>,

    // capabilities: issued index to name, and the names the module owns
    pub(crate) next_capability: u64,
    pub(crate) issued_capabilities: BTreeMap<u64, String>,
    pub(crate) owned_capabilities: BTreeMap<String, u64>,

    // reward module store
    pub(crate) bound_port: Option<PortId>,
    pub(crate) channel_records: BTreeMap<(String, String), ChannelRecord>,
    pub(crate) escrow_records: BTreeMap<(String, String, Denom), EscrowRecord>,
    pub(crate) packet_records: BTreeMap<(String, String, u64), PacketRecord>,
    pub(crate) next_sequence_recv: BTreeMap<(String, String), Sequence>,
    pub(crate) received_snapshots: BTreeMap<(String, String, String), RewardSnapshot>,

    pub events: Vec<ModuleEvent>,
    pub logs: Vec<String>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(MockChainConfig::default())
    }
}

impl MockChain {
    pub fn new(config: MockChainConfig) -> Self {
        let MockChainConfig {
            chain_id,
            params,
            bond_denom,
            host_height,
            counterparty_height,
            counterparty_timestamp,
        } = config;

        let mut chain = Self {
            chain_id,
            params,
            host_height,
            accounts: BTreeSet::new(),
            balances: BTreeMap::new(),
            blocked: BTreeSet::new(),
            send_disabled: BTreeSet::new(),
            bond_denom,
            validators: BTreeMap::new(),
            delegations: BTreeMap::new(),
            rewards: BTreeMap::new(),
            redelegations: BTreeSet::new(),
            connection_id: ConnectionId::new(0),
            client_id: "07-tendermint-0".parse().expect("Never fails"),
            counterparty_height,
            counterparty_timestamp,
            channel_ends: BTreeMap::new(),
            next_channel: 0,
            next_sequence_send: BTreeMap::new(),
            commitments: BTreeMap::new(),
            bound_ports: BTreeSet::new(),
            next_capability: 0,
            issued_capabilities: BTreeMap::new(),
            owned_capabilities: BTreeMap::new(),
            bound_port: None,
            channel_records: BTreeMap::new(),
            escrow_records: BTreeMap::new(),
            packet_records: BTreeMap::new(),
            next_sequence_recv: BTreeMap::new(),
            received_snapshots: BTreeMap::new(),
            events: Vec::new(),
            logs: Vec::new(),
        };
        chain.accounts.insert(chain.module_account().to_string());
        chain
    }

    /// The address of the reward module account.
    pub fn module_account(&self) -> Signer {
        format!("{}-module-{MODULE_ACCOUNT_NAME}", self.chain_id).into()
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// The port of the fungible token transfer application.
    pub fn transfer_port_id(&self) -> PortId {
        TRANSFER_PORT_STR.parse().expect("Never fails")
    }

    /// The port the reward module binds by default.
    /// The port the chain's params configure for the reward module.
    pub fn reward_port_id(&self) -> PortId {
        self.params.port_id.clone()
    }

    pub fn set_params(&mut self, params: RewardParams) {
        self.params = params;
    }

    /// Credits `coin` to `account` out of thin air.
    pub fn fund(&mut self, account: &Signer, coin: &Coin) {
        self.accounts.insert(account.to_string());
        let balance = self
            .balances
            .entry((account.to_string(), coin.denom.clone()))
            .or_default();
        *balance = balance
            .checked_add(coin.amount)
            .expect("test balances never overflow");
    }

    pub fn add_validator(&mut self, validator: ValidatorInfo) {
        self.validators.insert(validator.address.clone(), validator);
    }

    /// Registers a delegation of `delegator` to `validator`, with `reward`
    /// accrued and not yet withdrawn.
    pub fn delegate(
        &mut self,
        delegator: &Signer,
        validator: &ValidatorAddress,
        shares: impl Into<Amount>,
        reward: impl Into<Amount>,
    ) {
        self.accounts.insert(delegator.to_string());
        self.delegations
            .entry(delegator.to_string())
            .or_default()
            .push(Delegation {
                validator: validator.clone(),
                shares: shares.into(),
            });
        self.rewards
            .insert((delegator.to_string(), validator.clone()), reward.into());
    }

    pub fn start_redelegation(&mut self, delegator: &Signer, validator: &ValidatorAddress) {
        self.redelegations
            .insert((delegator.to_string(), validator.clone()));
    }

    pub fn block_address(&mut self, account: &Signer) {
        self.blocked.insert(account.to_string());
    }

    pub fn disable_send(&mut self, denom: &Denom) {
        self.send_disabled.insert(denom.clone());
    }

    /// Moves the chain's view of the counterparty forward.
    pub fn advance_counterparty(&mut self, height: Height, timestamp: Timestamp) {
        self.counterparty_height = height;
        self.counterparty_timestamp = timestamp;
    }

    pub fn counterparty_height(&self) -> Height {
        self.counterparty_height
    }

    pub fn counterparty_timestamp(&self) -> Timestamp {
        self.counterparty_timestamp
    }

    /// Allocates the identifier of the next channel the core opens.
    pub fn allocate_channel_id(&mut self) -> ChannelId {
        let channel_id = ChannelId::new(self.next_channel);
        self.next_channel += 1;
        channel_id
    }

    /// Stores the core's view of a channel end.
    pub fn store_channel_end(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        channel_end: ChannelEnd,
    ) {
        self.channel_ends
            .insert(channel_key(port_id, channel_id), channel_end);
    }

    pub fn stored_channel_end(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<&ChannelEnd> {
        self.channel_ends.get(&channel_key(port_id, channel_id))
    }

    /// The packet committed under `sequence`, if any.
    pub fn commitment(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Option<&Packet> {
        self.commitments
            .get(&packet_key(port_id, channel_id, &sequence))
    }

    /// Drops the commitment of a packet once its acknowledgement or timeout
    /// was processed.
    pub fn clear_commitment(&mut self, port_id: &PortId, channel_id: &ChannelId, sequence: Sequence) {
        self.commitments
            .remove(&packet_key(port_id, channel_id, &sequence));
    }

    /// Balance of `account` in `denom`, zero when unknown.
    pub fn balance_of(&self, account: &Signer, denom: &Denom) -> Amount {
        self.balances
            .get(&(account.to_string(), denom.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub fn escrow_of(&self, port_id: &PortId, channel_id: &ChannelId, denom: &Denom) -> EscrowRecord {
        self.escrow_records
            .get(&escrow_key(port_id, channel_id, denom))
            .cloned()
            .unwrap_or_default()
    }

    pub fn packet_record_of(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Option<&PacketRecord> {
        self.packet_records
            .get(&packet_key(port_id, channel_id, &sequence))
    }

    pub fn channel_record_of(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<&ChannelRecord> {
        self.channel_records.get(&channel_key(port_id, channel_id))
    }

    pub fn received_snapshot_of(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        delegator: &Signer,
    ) -> Option<&RewardSnapshot> {
        self.received_snapshots.get(&(
            port_id.to_string(),
            channel_id.to_string(),
            delegator.to_string(),
        ))
    }

    pub fn has_account_for(&self, account: &Signer) -> bool {
        self.accounts.contains(&account.to_string())
    }

    /// Takes away the module's ownership of a channel capability, as if it
    /// had never been claimed.
    pub fn revoke_channel_capability(&mut self, port_id: &PortId, channel_id: &ChannelId) {
        self.owned_capabilities
            .remove(&cht_reward_types::channel_capability_name(port_id, channel_id));
    }

    /// A rendering of every piece of state an operation may change, for
    /// comparing the chain before and after it. Events and logs are left out.
    pub fn state_fingerprint(&self) -> String {
        format!(
            "{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}",
            self.accounts,
            self.balances,
            self.channel_ends,
            self.next_sequence_send,
            self.commitments,
            self.owned_capabilities,
            self.channel_records,
            self.escrow_records,
            self.packet_records,
            self.next_sequence_recv,
            self.received_snapshots,
        )
    }

    /// Events of the given kind emitted so far.
    pub fn events_of_kind(&self, kind: &str) -> Vec<&ModuleEvent> {
        self.events.iter().filter(|ev| ev.kind == kind).collect()
    }
}

pub(crate) fn channel_key(port_id: &PortId, channel_id: &ChannelId) -> (String, String) {
    (port_id.to_string(), channel_id.to_string())
}

pub(crate) fn packet_key(
    port_id: &PortId,
    channel_id: &ChannelId,
    sequence: &Sequence,
) -> (String, String, u64) {
    (port_id.to_string(), channel_id.to_string(), sequence.value())
}

pub(crate) fn escrow_key(
    port_id: &PortId,
    channel_id: &ChannelId,
    denom: &Denom,
) -> (String, String, Denom) {
    (port_id.to_string(), channel_id.to_string(), denom.clone())
}

//! Defines the keeper interfaces the reward application consumes and the
//! main context traits a host implements to run it.
//!
//! Each keeper trait covers one external capability of the host chain. The
//! application never sees the host's concrete state types, only these
//! operations.
use cht_reward_types::error::RewardError;
use cht_reward_types::{
    Amount, Capability, ChannelRecord, Coin, Delegation, Denom, EscrowRecord, PacketRecord,
    RewardParams, RewardSnapshot, ValidatorAddress, ValidatorInfo,
};
use ibc_core::channel::types::channel::ChannelEnd;
use ibc_core::channel::types::packet::Packet;
use ibc_core::client::types::Height;
use ibc_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};
use ibc_core::router::types::event::ModuleEvent;

/// Balances, minting and burning.
pub trait BankKeeper {
    fn balance(&self, account: &Signer, denom: &Denom) -> Result<Amount, RewardError>;

    /// Whether coins of `denom` may leave the chain.
    fn is_send_enabled(&self, denom: &Denom) -> bool;

    /// Whether `account` is barred from receiving funds.
    fn is_blocked_address(&self, account: &Signer) -> bool;

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Signer,
        module: &str,
        coin: &Coin,
    ) -> Result<(), RewardError>;

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Signer,
        coin: &Coin,
    ) -> Result<(), RewardError>;

    /// Mints `coin` into the account of `module`.
    fn mint_coins(&mut self, module: &str, coin: &Coin) -> Result<(), RewardError>;

    /// Burns `coin` from the account of `module`.
    fn burn_coins(&mut self, module: &str, coin: &Coin) -> Result<(), RewardError>;
}

pub trait AccountKeeper {
    fn has_account(&self, account: &Signer) -> bool;

    /// Creates and stores a new account for `account`.
    fn new_account_with_address(&mut self, account: &Signer) -> Result<(), RewardError>;

    fn module_address(&self, module: &str) -> Signer;
}

pub trait StakingKeeper {
    fn bond_denom(&self) -> Result<Denom, RewardError>;

    fn validator(&self, validator: &ValidatorAddress) -> Option<ValidatorInfo>;

    fn delegator_delegations(&self, delegator: &Signer) -> Vec<Delegation>;

    /// Whether `delegator` has an unfinished redelegation into `validator`.
    fn has_receiving_redelegation(&self, delegator: &Signer, validator: &ValidatorAddress)
        -> bool;
}

pub trait DistributionKeeper {
    /// Rewards accrued by the delegation of `delegator` to `validator` that
    /// have not been withdrawn yet.
    fn delegation_rewards(
        &self,
        delegator: &Signer,
        validator: &ValidatorAddress,
    ) -> Result<Amount, RewardError>;
}

pub trait ChannelKeeper {
    fn channel_end(&self, port_id: &PortId, channel_id: &ChannelId)
        -> Result<ChannelEnd, RewardError>;

    fn next_sequence_send(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, RewardError>;

    /// Commits `packet`. The keeper allocates nothing: `packet.seq_on_a` must
    /// be the channel's next send sequence.
    fn send_packet(&mut self, capability: &Capability, packet: Packet) -> Result<(), RewardError>;

    fn chan_close_init(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        capability: &Capability,
    ) -> Result<(), RewardError>;
}

pub trait ClientKeeper {
    fn client_latest_height(&self, client_id: &ClientId) -> Result<Height, RewardError>;

    fn client_consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, RewardError>;
}

pub trait ConnectionKeeper {
    /// The client of the connection, tracking the counterparty chain.
    fn connection_client_id(&self, connection_id: &ConnectionId) -> Result<ClientId, RewardError>;
}

pub trait PortKeeper {
    /// Binds `port_id` and returns its freshly issued port capability.
    fn bind_port(&mut self, port_id: &PortId) -> Result<Capability, RewardError>;
}

/// The reward module's scoped view of the host capability keeper.
pub trait CapabilityKeeper {
    /// Issues a new capability registered under `name`, not yet owned by the
    /// module.
    fn new_capability(&mut self, name: &str) -> Result<Capability, RewardError>;

    /// The capability the module owns under `name`, if any.
    fn get_capability(&self, name: &str) -> Option<Capability>;

    /// Makes the module an owner of `capability` under `name`.
    fn claim_capability(&mut self, capability: &Capability, name: &str)
        -> Result<(), RewardError>;

    /// Whether the module owns `capability` under `name`.
    fn authenticate_capability(&self, capability: &Capability, name: &str) -> bool;

    fn release_capability(&mut self, capability: &Capability) -> Result<(), RewardError>;
}

/// Provides the port of the fungible token transfer application, which the
/// reward application must never bind.
pub trait TransferPortSource {
    fn transfer_port(&self) -> PortId;
}

/// Methods required in reward validation, to be implemented by the host
pub trait RewardValidationContext:
    BankKeeper
    + AccountKeeper
    + StakingKeeper
    + DistributionKeeper
    + ChannelKeeper
    + ClientKeeper
    + ConnectionKeeper
    + PortKeeper
    + CapabilityKeeper
    + TransferPortSource
{
    fn params(&self) -> RewardParams;

    /// The port bound by the module, once bound.
    fn bound_port(&self) -> Option<PortId>;

    /// Current height of the host chain.
    fn host_height(&self) -> u64;

    fn channel_record(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<ChannelRecord>;

    fn escrow_record(&self, port_id: &PortId, channel_id: &ChannelId, denom: &Denom)
        -> EscrowRecord;

    fn packet_record(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: &Sequence,
    ) -> Option<PacketRecord>;

    /// All packet records of a channel, in ascending sequence order.
    fn packet_records(&self, port_id: &PortId, channel_id: &ChannelId)
        -> Vec<(Sequence, PacketRecord)>;

    /// The next sequence an ordered channel expects to receive.
    fn next_sequence_recv(&self, port_id: &PortId, channel_id: &ChannelId) -> Sequence;

    fn received_snapshot(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        delegator: &Signer,
    ) -> Option<RewardSnapshot>;
}

/// Methods required in reward execution, to be implemented by the host
pub trait RewardExecutionContext: RewardValidationContext {
    fn store_bound_port(&mut self, port_id: PortId) -> Result<(), RewardError>;

    fn store_channel_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        record: ChannelRecord,
    ) -> Result<(), RewardError>;

    fn store_escrow_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        denom: &Denom,
        record: EscrowRecord,
    ) -> Result<(), RewardError>;

    fn store_packet_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        record: PacketRecord,
    ) -> Result<(), RewardError>;

    fn delete_packet_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: &Sequence,
    ) -> Result<(), RewardError>;

    fn store_next_sequence_recv(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<(), RewardError>;

    fn store_received_snapshot(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        snapshot: RewardSnapshot,
    ) -> Result<(), RewardError>;

    /// Called upon a successful reward transfer
    fn emit_event(&mut self, event: ModuleEvent) -> Result<(), RewardError>;

    /// Logs the given message.
    fn log_message(&mut self, message: String) -> Result<(), RewardError>;
}

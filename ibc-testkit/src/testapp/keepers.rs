use cht_reward::context::{
    AccountKeeper, BankKeeper, CapabilityKeeper, ChannelKeeper, ClientKeeper, ConnectionKeeper,
    DistributionKeeper, PortKeeper, StakingKeeper, TransferPortSource,
};
use cht_reward_types::error::RewardError;
use cht_reward_types::{
    port_capability_name, Amount, Capability, Coin, Delegation, Denom, ValidatorAddress,
    ValidatorInfo,
};
use ibc_core::channel::types::channel::{ChannelEnd, State};
use ibc_core::channel::types::packet::Packet;
use ibc_core::client::types::Height;
use ibc_core::host::types::identifiers::{ChannelId, ClientId, ConnectionId, PortId, Sequence};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::{Signer, Timestamp};

use crate::hosts::chain::{channel_key, packet_key};
use crate::hosts::MockChain;

impl MockChain {
    fn credit(&mut self, account: &Signer, coin: &Coin) -> Result<(), RewardError> {
        let balance = self
            .balances
            .entry((account.to_string(), coin.denom.clone()))
            .or_default();
        *balance = balance
            .checked_add(coin.amount)
            .ok_or(RewardError::AmountOverflow)?;
        Ok(())
    }

    fn debit(&mut self, account: &Signer, coin: &Coin) -> Result<(), RewardError> {
        let available = self.balance_of(account, &coin.denom);
        let remaining =
            available
                .checked_sub(coin.amount)
                .ok_or_else(|| RewardError::InsufficientFunds {
                    send_attempt: coin.to_string(),
                    available_funds: Coin::new(coin.denom.clone(), available).to_string(),
                })?;
        self.balances
            .insert((account.to_string(), coin.denom.clone()), remaining);
        Ok(())
    }

    /// Moves `coin` between accounts, leaving both untouched on failure.
    fn transfer(&mut self, from: &Signer, to: &Signer, coin: &Coin) -> Result<(), RewardError> {
        self.balance_of(to, &coin.denom)
            .checked_add(coin.amount)
            .ok_or(RewardError::AmountOverflow)?;
        self.debit(from, coin)?;
        self.credit(to, coin)
    }

    fn issue_capability(&mut self, name: &str) -> Capability {
        let index = self.next_capability;
        self.next_capability += 1;
        self.issued_capabilities.insert(index, name.to_string());
        Capability::new(index)
    }
}

impl BankKeeper for MockChain {
    fn balance(&self, account: &Signer, denom: &Denom) -> Result<Amount, RewardError> {
        Ok(self.balance_of(account, denom))
    }

    fn is_send_enabled(&self, denom: &Denom) -> bool {
        !self.send_disabled.contains(denom)
    }

    fn is_blocked_address(&self, account: &Signer) -> bool {
        self.blocked.contains(&account.to_string())
    }

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Signer,
        module: &str,
        coin: &Coin,
    ) -> Result<(), RewardError> {
        let module_address = self.module_address(module);
        self.transfer(sender, &module_address, coin)
    }

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Signer,
        coin: &Coin,
    ) -> Result<(), RewardError> {
        if self.is_blocked_address(recipient) {
            return Err(RewardError::BlockedAddress {
                address: recipient.to_string(),
            });
        }
        let module_address = self.module_address(module);
        self.transfer(&module_address, recipient, coin)
    }

    fn mint_coins(&mut self, module: &str, coin: &Coin) -> Result<(), RewardError> {
        let module_address = self.module_address(module);
        tracing::debug!(target: "cht-reward-testkit", chain = %self.chain_id, %coin, "mint");
        self.credit(&module_address, coin)
    }

    fn burn_coins(&mut self, module: &str, coin: &Coin) -> Result<(), RewardError> {
        let module_address = self.module_address(module);
        tracing::debug!(target: "cht-reward-testkit", chain = %self.chain_id, %coin, "burn");
        self.debit(&module_address, coin)
    }
}

impl AccountKeeper for MockChain {
    fn has_account(&self, account: &Signer) -> bool {
        self.accounts.contains(&account.to_string())
    }

    fn new_account_with_address(&mut self, account: &Signer) -> Result<(), RewardError> {
        if !self.accounts.insert(account.to_string()) {
            return Err(RewardError::host(format!("account {account} already exists")));
        }
        Ok(())
    }

    fn module_address(&self, module: &str) -> Signer {
        format!("{}-module-{module}", self.chain_id).into()
    }
}

impl StakingKeeper for MockChain {
    fn bond_denom(&self) -> Result<Denom, RewardError> {
        Ok(self.bond_denom.clone())
    }

    fn validator(&self, validator: &ValidatorAddress) -> Option<ValidatorInfo> {
        self.validators.get(validator).cloned()
    }

    fn delegator_delegations(&self, delegator: &Signer) -> Vec<Delegation> {
        self.delegations
            .get(&delegator.to_string())
            .cloned()
            .unwrap_or_default()
    }

    fn has_receiving_redelegation(
        &self,
        delegator: &Signer,
        validator: &ValidatorAddress,
    ) -> bool {
        self.redelegations
            .contains(&(delegator.to_string(), validator.clone()))
    }
}

impl DistributionKeeper for MockChain {
    fn delegation_rewards(
        &self,
        delegator: &Signer,
        validator: &ValidatorAddress,
    ) -> Result<Amount, RewardError> {
        Ok(self
            .rewards
            .get(&(delegator.to_string(), validator.clone()))
            .copied()
            .unwrap_or_default())
    }
}

impl ChannelKeeper for MockChain {
    fn channel_end(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ChannelEnd, RewardError> {
        self.stored_channel_end(port_id, channel_id)
            .cloned()
            .ok_or_else(|| RewardError::host(format!("no channel end for {port_id}/{channel_id}")))
    }

    fn next_sequence_send(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, RewardError> {
        Ok(self
            .next_sequence_send
            .get(&channel_key(port_id, channel_id))
            .copied()
            .unwrap_or_else(|| Sequence::from(1)))
    }

    fn send_packet(&mut self, capability: &Capability, packet: Packet) -> Result<(), RewardError> {
        if !self.authenticate_capability(
            capability,
            &cht_reward_types::channel_capability_name(&packet.port_id_on_a, &packet.chan_id_on_a),
        ) {
            return Err(RewardError::CapabilityAuthentication {
                port_id: packet.port_id_on_a,
                channel_id: packet.chan_id_on_a,
            });
        }

        let expected = self.next_sequence_send(&packet.port_id_on_a, &packet.chan_id_on_a)?;
        if packet.seq_on_a != expected {
            return Err(RewardError::host(format!(
                "packet sequence {} does not match the next send sequence {expected}",
                packet.seq_on_a
            )));
        }

        tracing::info!(
            target: "cht-reward-testkit",
            chain = %self.chain_id,
            channel = %packet.chan_id_on_a,
            sequence = %packet.seq_on_a,
            "committed packet"
        );

        self.next_sequence_send.insert(
            channel_key(&packet.port_id_on_a, &packet.chan_id_on_a),
            expected.increment(),
        );
        self.commitments.insert(
            packet_key(&packet.port_id_on_a, &packet.chan_id_on_a, &packet.seq_on_a),
            packet,
        );

        Ok(())
    }

    fn chan_close_init(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        capability: &Capability,
    ) -> Result<(), RewardError> {
        if !self.authenticate_capability(
            capability,
            &cht_reward_types::channel_capability_name(port_id, channel_id),
        ) {
            return Err(RewardError::CapabilityAuthentication {
                port_id: port_id.clone(),
                channel_id: channel_id.clone(),
            });
        }

        let chan_end = self.channel_end(port_id, channel_id)?;
        if chan_end.state() == &State::Closed {
            return Err(RewardError::host(format!(
                "channel {channel_id} is already closed"
            )));
        }

        let closed = ChannelEnd::new(
            State::Closed,
            *chan_end.ordering(),
            chan_end.counterparty().clone(),
            chan_end.connection_hops().clone(),
            chan_end.version().clone(),
        )
        .map_err(RewardError::host)?;
        self.store_channel_end(port_id, channel_id, closed);

        Ok(())
    }
}

impl ClientKeeper for MockChain {
    fn client_latest_height(&self, client_id: &ClientId) -> Result<Height, RewardError> {
        if client_id != &self.client_id {
            return Err(RewardError::host(format!("unknown client {client_id}")));
        }
        Ok(self.counterparty_height)
    }

    fn client_consensus_timestamp(
        &self,
        client_id: &ClientId,
        height: &Height,
    ) -> Result<Timestamp, RewardError> {
        if client_id != &self.client_id || height != &self.counterparty_height {
            return Err(RewardError::host(format!(
                "no consensus state for client {client_id} at {height}"
            )));
        }
        Ok(self.counterparty_timestamp)
    }
}

impl ConnectionKeeper for MockChain {
    fn connection_client_id(&self, connection_id: &ConnectionId) -> Result<ClientId, RewardError> {
        if connection_id != &self.connection_id {
            return Err(RewardError::host(format!(
                "unknown connection {connection_id}"
            )));
        }
        Ok(self.client_id.clone())
    }
}

impl PortKeeper for MockChain {
    fn bind_port(&mut self, port_id: &PortId) -> Result<Capability, RewardError> {
        if !self.bound_ports.insert(port_id.to_string()) {
            return Err(RewardError::PortAlreadyBound {
                port_id: port_id.clone(),
            });
        }
        Ok(self.issue_capability(&port_capability_name(port_id)))
    }
}

impl CapabilityKeeper for MockChain {
    fn new_capability(&mut self, name: &str) -> Result<Capability, RewardError> {
        if self.issued_capabilities.values().any(|issued| issued == name) {
            return Err(RewardError::host(format!("capability {name} already issued")));
        }
        Ok(self.issue_capability(name))
    }

    fn get_capability(&self, name: &str) -> Option<Capability> {
        self.owned_capabilities
            .get(name)
            .map(|index| Capability::new(*index))
    }

    fn claim_capability(
        &mut self,
        capability: &Capability,
        name: &str,
    ) -> Result<(), RewardError> {
        if self.issued_capabilities.get(&capability.index()).map(String::as_str) != Some(name) {
            return Err(RewardError::host(format!(
                "capability {} was not issued under {name}",
                capability.index()
            )));
        }
        if self.owned_capabilities.contains_key(name) {
            return Err(RewardError::CapabilityAlreadyClaimed {
                name: name.to_string(),
            });
        }
        self.owned_capabilities
            .insert(name.to_string(), capability.index());
        Ok(())
    }

    fn authenticate_capability(&self, capability: &Capability, name: &str) -> bool {
        self.issued_capabilities.get(&capability.index()).map(String::as_str) == Some(name)
            && self.owned_capabilities.get(name) == Some(&capability.index())
    }

    fn release_capability(&mut self, capability: &Capability) -> Result<(), RewardError> {
        let name = self
            .issued_capabilities
            .remove(&capability.index())
            .ok_or_else(|| {
                RewardError::host(format!("capability {} was never issued", capability.index()))
            })?;
        if self.owned_capabilities.get(&name) == Some(&capability.index()) {
            self.owned_capabilities.remove(&name);
        }
        Ok(())
    }
}

impl TransferPortSource for MockChain {
    fn transfer_port(&self) -> PortId {
        self.transfer_port_id()
    }
}

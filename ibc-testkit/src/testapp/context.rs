use cht_reward::context::{RewardExecutionContext, RewardValidationContext};
use cht_reward_types::error::RewardError;
use cht_reward_types::{
    ChannelRecord, Denom, EscrowRecord, PacketRecord, RewardParams, RewardSnapshot,
};
use ibc_core::host::types::identifiers::{ChannelId, PortId, Sequence};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;
use ibc_core::router::types::event::ModuleEvent;

use crate::hosts::chain::{channel_key, escrow_key, packet_key};
use crate::hosts::MockChain;

impl RewardValidationContext for MockChain {
    fn params(&self) -> RewardParams {
        self.params.clone()
    }

    fn bound_port(&self) -> Option<PortId> {
        self.bound_port.clone()
    }

    fn host_height(&self) -> u64 {
        self.host_height
    }

    fn channel_record(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<ChannelRecord> {
        self.channel_records
            .get(&channel_key(port_id, channel_id))
            .cloned()
    }

    fn escrow_record(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        denom: &Denom,
    ) -> EscrowRecord {
        self.escrow_of(port_id, channel_id, denom)
    }

    fn packet_record(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: &Sequence,
    ) -> Option<PacketRecord> {
        self.packet_records
            .get(&packet_key(port_id, channel_id, sequence))
            .cloned()
    }

    fn packet_records(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Vec<(Sequence, PacketRecord)> {
        let (port, channel) = channel_key(port_id, channel_id);
        self.packet_records
            .iter()
            .filter(|((p, c, _), _)| p == &port && c == &channel)
            .map(|((_, _, sequence), record)| (Sequence::from(*sequence), record.clone()))
            .collect()
    }

    fn next_sequence_recv(&self, port_id: &PortId, channel_id: &ChannelId) -> Sequence {
        self.next_sequence_recv
            .get(&channel_key(port_id, channel_id))
            .copied()
            .unwrap_or_else(|| Sequence::from(1))
    }

    fn received_snapshot(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        delegator: &Signer,
    ) -> Option<RewardSnapshot> {
        self.received_snapshot_of(port_id, channel_id, delegator)
            .cloned()
    }
}

impl RewardExecutionContext for MockChain {
    fn store_bound_port(&mut self, port_id: PortId) -> Result<(), RewardError> {
        self.bound_port = Some(port_id);
        Ok(())
    }

    fn store_channel_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        record: ChannelRecord,
    ) -> Result<(), RewardError> {
        self.channel_records
            .insert(channel_key(port_id, channel_id), record);
        Ok(())
    }

    fn store_escrow_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        denom: &Denom,
        record: EscrowRecord,
    ) -> Result<(), RewardError> {
        self.escrow_records
            .insert(escrow_key(port_id, channel_id, denom), record);
        Ok(())
    }

    fn store_packet_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        record: PacketRecord,
    ) -> Result<(), RewardError> {
        self.packet_records
            .insert(packet_key(port_id, channel_id, &sequence), record);
        Ok(())
    }

    fn delete_packet_record(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: &Sequence,
    ) -> Result<(), RewardError> {
        self.packet_records
            .remove(&packet_key(port_id, channel_id, sequence));
        Ok(())
    }

    fn store_next_sequence_recv(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<(), RewardError> {
        self.next_sequence_recv
            .insert(channel_key(port_id, channel_id), sequence);
        Ok(())
    }

    fn store_received_snapshot(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        snapshot: RewardSnapshot,
    ) -> Result<(), RewardError> {
        self.received_snapshots.insert(
            (
                port_id.to_string(),
                channel_id.to_string(),
                snapshot.delegator().to_string(),
            ),
            snapshot,
        );
        Ok(())
    }

    fn emit_event(&mut self, event: ModuleEvent) -> Result<(), RewardError> {
        self.events.push(event);
        Ok(())
    }

    fn log_message(&mut self, message: String) -> Result<(), RewardError> {
        tracing::debug!(target: "cht-reward-testkit", chain = %self.chain_id, "{message}");
        self.logs.push(message);
        Ok(())
    }
}

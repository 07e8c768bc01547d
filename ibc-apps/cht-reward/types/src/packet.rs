//! Contains the `RewardPacketData` type that defines the structure of reward
//! relay packets' bytes.
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;
use crate::{Amount, Coin, Denom, Memo, RewardEntry, RewardSnapshot, ValidatorAddress};

/// Defines the structure of reward relay packets' bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRewardPacketData", into = "RawRewardPacketData")]
pub struct RewardPacketData {
    pub snapshot: RewardSnapshot,
    pub receiver: Signer,
    pub memo: Memo,
}

impl RewardPacketData {
    /// The coin escrowed on the source chain for this packet.
    pub fn coin(&self) -> Result<Coin, RewardError> {
        self.snapshot.total_coin()
    }
}

/// Wire form of [`RewardPacketData`].
///
/// Field order is fixed by declaration order, and `rewards` is sorted by
/// validator address, so a given packet always encodes to the same bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRewardPacketData {
    pub delegator: String,
    pub receiver: String,
    pub denom: String,
    pub amount: String,
    pub taken_at: u64,
    pub rewards: Vec<RawRewardEntry>,
    #[serde(default)]
    pub memo: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRewardEntry {
    pub validator: String,
    pub shares: String,
    pub reward: String,
    pub bonded: bool,
    pub redelegating: bool,
}

impl TryFrom<RawRewardEntry> for RewardEntry {
    type Error = RewardError;

    fn try_from(raw: RawRewardEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            validator: raw.validator.parse()?,
            shares: raw.shares.parse()?,
            reward: raw.reward.parse()?,
            bonded: raw.bonded,
            redelegating: raw.redelegating,
        })
    }
}

impl From<RewardEntry> for RawRewardEntry {
    fn from(entry: RewardEntry) -> Self {
        Self {
            validator: entry.validator.to_string(),
            shares: entry.shares.to_string(),
            reward: entry.reward.to_string(),
            bonded: entry.bonded,
            redelegating: entry.redelegating,
        }
    }
}

impl TryFrom<RawRewardPacketData> for RewardPacketData {
    type Error = RewardError;

    fn try_from(raw: RawRewardPacketData) -> Result<Self, Self::Error> {
        if raw.receiver.trim().is_empty() {
            return Err(RewardError::EmptyReceiver);
        }

        let denom: Denom = raw.denom.parse()?;
        let amount: Amount = raw.amount.parse()?;
        if amount.is_zero() {
            return Err(RewardError::NothingToRelay {
                delegator: raw.delegator,
            });
        }

        let entries = raw
            .rewards
            .into_iter()
            .map(RewardEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // Canonical payloads are strictly ascending; equal neighbours are duplicates.
        for pair in entries.windows(2) {
            match pair[0].validator.cmp(&pair[1].validator) {
                core::cmp::Ordering::Less => {}
                core::cmp::Ordering::Equal => {
                    return Err(RewardError::DuplicateValidator {
                        validator: pair[0].validator.to_string(),
                    })
                }
                core::cmp::Ordering::Greater => return Err(RewardError::UnsortedRewardEntries),
            }
        }

        let snapshot = RewardSnapshot::new(raw.delegator.into(), denom, entries, raw.taken_at)?;

        let entries_total = snapshot.total()?;
        if entries_total != amount {
            return Err(RewardError::RewardTotalMismatch {
                entries_total: entries_total.to_string(),
                amount: amount.to_string(),
            });
        }

        Ok(Self {
            snapshot,
            receiver: raw.receiver.into(),
            memo: raw.memo.into(),
        })
    }
}

impl From<RewardPacketData> for RawRewardPacketData {
    fn from(pkt_data: RewardPacketData) -> Self {
        // `RewardSnapshot::new` already rejected totals that overflow.
        let amount = pkt_data.snapshot.total().unwrap_or_default();
        Self {
            delegator: pkt_data.snapshot.delegator().to_string(),
            receiver: pkt_data.receiver.to_string(),
            denom: pkt_data.snapshot.denom().to_string(),
            amount: amount.to_string(),
            taken_at: pkt_data.snapshot.taken_at(),
            rewards: pkt_data
                .snapshot
                .entries()
                .iter()
                .cloned()
                .map(RawRewardEntry::from)
                .collect(),
            memo: pkt_data.memo.to_string(),
        }
    }
}

/// Validators carried by a packet, in wire order.
pub fn packet_validators(pkt_data: &RewardPacketData) -> Vec<ValidatorAddress> {
    pkt_data.snapshot.validators().cloned().collect()
}

//! Point-in-time view of a delegator's delegations and unclaimed rewards.
use core::str::FromStr;

use derive_more::Display;
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;

use crate::error::RewardError;
use crate::{checked_sum, Amount, Coin, Denom};

/// Operator address of a validator.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Display)]
pub struct ValidatorAddress(String);

impl ValidatorAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ValidatorAddress {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.chars().any(char::is_whitespace) {
            return Err(RewardError::InvalidValidatorAddress {
                address: s.to_owned(),
            });
        }
        Ok(Self(s.to_owned()))
    }
}

/// A delegation as reported by the staking keeper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    pub validator: ValidatorAddress,
    pub shares: Amount,
}

/// The subset of validator state the snapshot cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub address: ValidatorAddress,
    pub bonded: bool,
    pub jailed: bool,
}

/// One validator's line in a [`RewardSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardEntry {
    pub validator: ValidatorAddress,
    pub shares: Amount,
    pub reward: Amount,
    pub bonded: bool,
    pub redelegating: bool,
}

/// A delegator's rewards across all the validators it delegates to, in the
/// staking bond denomination.
///
/// Entries are kept sorted by validator address and validators are unique,
/// so two chains encoding the same snapshot always produce the same bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardSnapshot {
    delegator: Signer,
    denom: Denom,
    entries: Vec<RewardEntry>,
    taken_at: u64,
}

impl RewardSnapshot {
    /// Builds a snapshot, sorting `entries` by validator address.
    pub fn new(
        delegator: Signer,
        denom: Denom,
        mut entries: Vec<RewardEntry>,
        taken_at: u64,
    ) -> Result<Self, RewardError> {
        if entries.is_empty() {
            return Err(RewardError::NoDelegations {
                delegator: delegator.to_string(),
            });
        }

        entries.sort_by(|a, b| a.validator.cmp(&b.validator));
        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].validator == pair[1].validator)
        {
            return Err(RewardError::DuplicateValidator {
                validator: pair[0].validator.to_string(),
            });
        }

        let snapshot = Self {
            delegator,
            denom,
            entries,
            taken_at,
        };
        snapshot.total()?;

        Ok(snapshot)
    }

    pub fn delegator(&self) -> &Signer {
        &self.delegator
    }

    pub fn denom(&self) -> &Denom {
        &self.denom
    }

    pub fn entries(&self) -> &[RewardEntry] {
        &self.entries
    }

    /// Host height the snapshot was read at.
    pub fn taken_at(&self) -> u64 {
        self.taken_at
    }

    pub fn validators(&self) -> impl Iterator<Item = &ValidatorAddress> {
        self.entries.iter().map(|entry| &entry.validator)
    }

    /// Sum of all rewards in the snapshot.
    pub fn total(&self) -> Result<Amount, RewardError> {
        checked_sum(self.entries.iter().map(|entry| entry.reward)).ok_or(RewardError::AmountOverflow)
    }

    /// The coin the snapshot's total is escrowed as.
    pub fn total_coin(&self) -> Result<Coin, RewardError> {
        Ok(Coin::new(self.denom.clone(), self.total()?))
    }
}

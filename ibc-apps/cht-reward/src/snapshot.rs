//! The reward snapshot provider.
use cht_reward_types::error::RewardError;
use cht_reward_types::{RewardEntry, RewardSnapshot};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;

use crate::context::{DistributionKeeper, StakingKeeper};

/// Reads the delegations of `delegator` and the rewards each of them accrued,
/// as of host height `taken_at`.
///
/// Read-only. Entries come out sorted by validator address regardless of the
/// order the staking keeper reports delegations in.
pub fn build_snapshot<K>(
    keeper: &K,
    delegator: &Signer,
    taken_at: u64,
) -> Result<RewardSnapshot, RewardError>
where
    K: StakingKeeper + DistributionKeeper,
{
    let denom = keeper.bond_denom()?;

    let entries = keeper
        .delegator_delegations(delegator)
        .into_iter()
        .map(|delegation| {
            let validator = keeper.validator(&delegation.validator).ok_or_else(|| {
                RewardError::ValidatorNotFound {
                    validator: delegation.validator.to_string(),
                }
            })?;
            let reward = keeper.delegation_rewards(delegator, &delegation.validator)?;
            let redelegating = keeper.has_receiving_redelegation(delegator, &delegation.validator);

            Ok(RewardEntry {
                validator: delegation.validator,
                shares: delegation.shares,
                reward,
                bonded: validator.bonded,
                redelegating,
            })
        })
        .collect::<Result<Vec<_>, RewardError>>()?;

    let snapshot = RewardSnapshot::new(delegator.clone(), denom, entries, taken_at)?;

    if snapshot.total()?.is_zero() {
        return Err(RewardError::NothingToRelay {
            delegator: delegator.to_string(),
        });
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use cht_reward_types::{Amount, Delegation, Denom, ValidatorAddress, ValidatorInfo};

    use super::*;
    use crate::context::{DistributionKeeper, StakingKeeper};

    struct Staking {
        delegations: Vec<(&'static str, u64)>,
        jailed: &'static str,
        redelegating_into: &'static str,
    }

    impl StakingKeeper for Staking {
        fn bond_denom(&self) -> Result<Denom, RewardError> {
            "ucht".parse()
        }

        fn validator(&self, validator: &ValidatorAddress) -> Option<ValidatorInfo> {
            Some(ValidatorInfo {
                address: validator.clone(),
                bonded: validator.as_str() != self.jailed,
                jailed: validator.as_str() == self.jailed,
            })
        }

        fn delegator_delegations(&self, _delegator: &Signer) -> Vec<Delegation> {
            self.delegations
                .iter()
                .map(|(validator, _)| Delegation {
                    validator: validator.parse().expect("valid validator"),
                    shares: Amount::from(1_000),
                })
                .collect()
        }

        fn has_receiving_redelegation(
            &self,
            _delegator: &Signer,
            validator: &ValidatorAddress,
        ) -> bool {
            validator.as_str() == self.redelegating_into
        }
    }

    impl DistributionKeeper for Staking {
        fn delegation_rewards(
            &self,
            _delegator: &Signer,
            validator: &ValidatorAddress,
        ) -> Result<Amount, RewardError> {
            self.delegations
                .iter()
                .find(|(v, _)| *v == validator.as_str())
                .map(|(_, reward)| Amount::from(*reward))
                .ok_or_else(|| RewardError::host("no delegation"))
        }
    }

    fn delegator() -> Signer {
        "cht1delegator".to_string().into()
    }

    #[test]
    fn snapshot_is_sorted_and_annotated() {
        let keeper = Staking {
            delegations: vec![("chtvaloper1zeta", 50), ("chtvaloper1alpha", 100)],
            jailed: "chtvaloper1zeta",
            redelegating_into: "chtvaloper1alpha",
        };

        let snapshot = build_snapshot(&keeper, &delegator(), 7).expect("snapshot");

        let entries = snapshot.entries();
        assert_eq!(entries[0].validator.as_str(), "chtvaloper1alpha");
        assert!(entries[0].bonded && entries[0].redelegating);
        assert_eq!(entries[1].validator.as_str(), "chtvaloper1zeta");
        assert!(!entries[1].bonded && !entries[1].redelegating);
        assert_eq!(snapshot.total().expect("no overflow"), Amount::from(150));
        assert_eq!(snapshot.taken_at(), 7);
    }

    #[test]
    fn no_delegations() {
        let keeper = Staking {
            delegations: vec![],
            jailed: "",
            redelegating_into: "",
        };
        let err = build_snapshot(&keeper, &delegator(), 1).expect_err("no delegations");
        assert!(matches!(err, RewardError::NoDelegations { .. }));
    }

    #[test]
    fn zero_rewards_are_not_relayed() {
        let keeper = Staking {
            delegations: vec![("chtvaloper1alpha", 0)],
            jailed: "",
            redelegating_into: "",
        };
        let err = build_snapshot(&keeper, &delegator(), 1).expect_err("nothing to relay");
        assert!(matches!(err, RewardError::NothingToRelay { .. }));
    }
}

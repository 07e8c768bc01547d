//! Contains the `Amount` type used for reward and escrow quantities.
use core::str::FromStr;

use derive_more::{Display, From, Into};
use ibc_core::primitives::prelude::*;
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RewardError;

/// An unsigned 256-bit quantity of a single denomination.
///
/// On the wire it is always a decimal string, so that both ends agree on the
/// encoding regardless of the integer width their platform favours.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Display, From, Into)]
pub struct Amount(U256);

impl Amount {
    pub const fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl AsRef<U256> for Amount {
    fn as_ref(&self) -> &U256 {
        &self.0
    }
}

impl FromStr for Amount {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = U256::from_dec_str(s).map_err(RewardError::InvalidAmount)?;
        Ok(Self(amount))
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(v.into())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Sums amounts, failing on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    amounts
        .into_iter()
        .try_fold(Amount::zero(), |acc, amount| acc.checked_add(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_amount() {
        let value = Amount::from(42);
        let string = serde_json::to_string(&value).expect("can serde string");
        assert_eq!(string, "\"42\"");
        let de: Amount = serde_json::from_str(&string).expect("can deserialize");
        assert_eq!(de, value);
    }

    #[test]
    fn reject_non_decimal_amount() {
        assert!("0x10".parse::<Amount>().is_err());
        assert!("-1".parse::<Amount>().is_err());
        assert!(serde_json::from_str::<Amount>("\"ten\"").is_err());
    }

    #[test]
    fn checked_arithmetic() {
        let max = Amount::from(U256::MAX);
        assert_eq!(max.checked_add(Amount::from(1)), None);
        assert_eq!(Amount::zero().checked_sub(Amount::from(1)), None);
        assert_eq!(
            checked_sum([Amount::from(100), Amount::from(50)]),
            Some(Amount::from(150))
        );
        assert_eq!(checked_sum([max, Amount::from(1)]), None);
    }
}

//! Denominations and coins moved by the reward application.
use core::fmt::{self, Display};
use core::str::FromStr;

use derive_more::Display;
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;
use crate::Amount;

/// A coin denomination, e.g. the staking bond denom `ucht`, or a voucher
/// denom `cht-reward/channel-0/ucht` minted on the receiving chain.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Denom(String);

impl Denom {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The denomination under which a coin arriving on `port_id`/`channel_id`
    /// is credited on the receiving chain.
    pub fn voucher(&self, port_id: &PortId, channel_id: &ChannelId) -> Self {
        Self(format!("{port_id}/{channel_id}/{}", self.0))
    }
}

impl FromStr for Denom {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(RewardError::EmptyDenom);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(RewardError::InvalidDenom {
                denom: s.to_owned(),
            });
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for Denom {
    type Error = RewardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Denom> for String {
    fn from(denom: Denom) -> Self {
        denom.0
    }
}

/// An amount of a single denomination.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: Denom,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: Denom, amount: impl Into<Amount>) -> Self {
        Self {
            denom,
            amount: amount.into(),
        }
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

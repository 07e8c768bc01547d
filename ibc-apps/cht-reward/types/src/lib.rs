//! Data structures of the `cht-reward` IBC application, which relays a
//! delegator's staking rewards between chains over an authenticated channel.
#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    rust_2018_idioms
)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod amount;
mod capability;
mod coin;
mod memo;
mod params;
mod records;
mod snapshot;

pub use amount::*;
pub use capability::*;
pub use coin::*;
pub use memo::*;
pub use params::*;
pub use records::*;
pub use snapshot::*;
pub mod error;
pub mod events;
pub mod msgs;
pub mod packet;
/// Re-exports `U256` from `primitive-types` crate for convenience.
pub use primitive_types::U256;

use ibc_core::channel::types::acknowledgement::StatusValue;

/// Module identifier of the reward application.
pub const MODULE_ID_STR: &str = "cht";

/// Name of the module account that holds escrowed rewards.
pub const MODULE_ACCOUNT_NAME: &str = "cht-reward";

/// The port identifier the reward application binds with by default.
pub const PORT_ID_STR: &str = "cht-reward";

/// Current version of the reward application.
pub const VERSION: &str = "cht-1";

/// The successful string used for creating an acknowledgement status,
/// equivalent to `base64::encode(0x01)`.
pub const ACK_SUCCESS_B64: &str = "AQ==";

/// Returns a successful acknowledgement status for the reward application.
pub fn ack_success_b64() -> StatusValue {
    StatusValue::new(ACK_SUCCESS_B64).expect("ack status value is never supposed to be empty")
}

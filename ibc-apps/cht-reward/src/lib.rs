//! Implementation of the `cht-reward` IBC application, which relays a
//! delegator's staking rewards to a counterparty chain.
//!
//! Rewards are escrowed in the module account when a packet is sent, and the
//! escrow is finalized on a successful acknowledgement or reversed on a
//! failed acknowledgement, a timeout, or the closing of the channel.
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

pub mod capability;
pub mod context;
pub mod escrow;
pub mod handler;
pub mod module;
pub mod snapshot;

/// Re-exports the domain types of the reward application.
pub mod types {
    #[doc(inline)]
    pub use cht_reward_types::*;
}

//! Implementations of the reward application's keeper and context traits
//! for [`MockChain`](crate::hosts::MockChain), and its router adapter.
mod context;
mod keepers;
mod module;

pub use module::RewardModule;

//! Messages accepted by the reward application.
mod close_channel;
mod transfer;

pub use close_channel::*;
pub use transfer::*;

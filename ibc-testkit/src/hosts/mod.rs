//! In-memory host chains for exercising the reward application.
pub mod chain;

pub use chain::{MockChain, MockChainConfig, GENESIS_TIMESTAMP_NANOS, TRANSFER_PORT_STR};

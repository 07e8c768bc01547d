//! Capability handles and the names they are registered under.
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;

/// An opaque handle to a permission issued by the host's capability keeper.
///
/// The handle is a plain index and anyone can construct one, so holding a
/// `Capability` proves nothing on its own. It only grants access once the
/// capability keeper authenticates it against the name it was claimed under,
/// and unforgeability rests with the keeper: it must tie each index to the
/// module that claimed it. There is no `PartialEq`; only the keeper compares
/// handles.
#[derive(Clone, Debug)]
pub struct Capability {
    index: u64,
}

impl Capability {
    /// Wraps a keeper-assigned index. Meant for capability keepers only.
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

/// The name a port capability is registered under.
pub fn port_capability_name(port_id: &PortId) -> String {
    format!("ports/{port_id}")
}

/// The name a channel capability is registered under.
pub fn channel_capability_name(port_id: &PortId, channel_id: &ChannelId) -> String {
    format!("capabilities/ports/{port_id}/channels/{channel_id}")
}

use ibc_core::host::types::identifiers::{ChannelId, PortId};
use serde::{Deserialize, Serialize};

/// Requests that the reward application close one of its channels.
///
/// Closing refunds every packet still in flight on the channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCloseChannel {
    pub port_id_on_a: PortId,
    pub chan_id_on_a: ChannelId,
}

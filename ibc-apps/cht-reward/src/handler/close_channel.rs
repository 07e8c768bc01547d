use cht_reward_types::error::RewardError;
use cht_reward_types::msgs::MsgCloseChannel;
use ibc_core::primitives::prelude::*;

use super::{close_channel_records_execute, close_channel_records_validate};
use crate::capability::channel_capability;
use crate::context::{RewardExecutionContext, RewardValidationContext};

/// Closes a reward channel from this end. Equivalent to calling
/// [`close_channel_validate`], followed by [`close_channel_execute`].
pub fn close_channel(
    ctx_a: &mut impl RewardExecutionContext,
    msg: MsgCloseChannel,
) -> Result<(), RewardError> {
    close_channel_validate(ctx_a, &msg)?;
    close_channel_execute(ctx_a, msg)
}

pub fn close_channel_validate(
    ctx_a: &impl RewardValidationContext,
    msg: &MsgCloseChannel,
) -> Result<(), RewardError> {
    channel_capability(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;
    close_channel_records_validate(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)
}

pub fn close_channel_execute(
    ctx_a: &mut impl RewardExecutionContext,
    msg: MsgCloseChannel,
) -> Result<(), RewardError> {
    let capability = channel_capability(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;

    ctx_a.chan_close_init(&msg.port_id_on_a, &msg.chan_id_on_a, &capability)?;

    let extras = close_channel_records_execute(ctx_a, &msg.port_id_on_a, &msg.chan_id_on_a)?;
    for event in extras.events {
        ctx_a.emit_event(event)?;
    }
    for message in extras.log {
        ctx_a.log_message(message)?;
    }

    Ok(())
}

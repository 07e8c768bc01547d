//! The capability guard: every channel-scoped operation of the application
//! proves its authority through these functions.
use cht_reward_types::error::RewardError;
use cht_reward_types::{channel_capability_name, port_capability_name, Capability};
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;

use crate::context::{RewardExecutionContext, RewardValidationContext};

pub fn bind_port_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
) -> Result<(), RewardError> {
    if let Some(bound_port) = ctx.bound_port() {
        return Err(RewardError::PortAlreadyBound {
            port_id: bound_port,
        });
    }

    if port_id == &ctx.transfer_port() {
        return Err(RewardError::ReservedPort {
            port_id: port_id.clone(),
        });
    }

    let configured_port = ctx.params().port_id;
    if port_id != &configured_port {
        return Err(RewardError::InvalidPort {
            port_id: port_id.clone(),
            exp_port_id: configured_port,
        });
    }

    if ctx.get_capability(&port_capability_name(port_id)).is_some() {
        return Err(RewardError::PortAlreadyBound {
            port_id: port_id.clone(),
        });
    }

    Ok(())
}

pub fn bind_port_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
) -> Result<(), RewardError> {
    let capability = ctx.bind_port(port_id)?;
    ctx.claim_capability(&capability, &port_capability_name(port_id))?;
    ctx.store_bound_port(port_id.clone())?;
    ctx.log_message(format!("bound port {port_id}"))?;

    Ok(())
}

/// Binds the port configured in the module params. A module binds exactly
/// one port, exactly once.
pub fn bind_port(ctx: &mut impl RewardExecutionContext, port_id: &PortId) -> Result<(), RewardError> {
    bind_port_validate(ctx, port_id)?;
    bind_port_execute(ctx, port_id)
}

/// Checks that the module is bound to `port_id` and owns its capability.
pub fn authenticate_port(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
) -> Result<(), RewardError> {
    let bound_port = ctx
        .bound_port()
        .ok_or_else(|| RewardError::PortCapabilityNotOwned {
            port_id: port_id.clone(),
        })?;
    if port_id != &bound_port {
        return Err(RewardError::InvalidPort {
            port_id: port_id.clone(),
            exp_port_id: bound_port,
        });
    }

    let name = port_capability_name(port_id);
    match ctx.get_capability(&name) {
        Some(capability) if ctx.authenticate_capability(&capability, &name) => Ok(()),
        _ => Err(RewardError::PortCapabilityNotOwned {
            port_id: port_id.clone(),
        }),
    }
}

/// Issues the capability of a channel entering the handshake. The module
/// holds it without owning it until the handshake completes.
pub fn issue_channel_capability(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Capability, RewardError> {
    ctx.new_capability(&channel_capability_name(port_id, channel_id))
}

pub fn claim_channel_capability_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), RewardError> {
    let name = channel_capability_name(port_id, channel_id);
    if ctx.get_capability(&name).is_some() {
        return Err(RewardError::CapabilityAlreadyClaimed { name });
    }
    Ok(())
}

/// Takes ownership of a channel capability. Fails if the name is already
/// claimed.
pub fn claim_channel_capability(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    capability: &Capability,
) -> Result<(), RewardError> {
    claim_channel_capability_validate(ctx, port_id, channel_id)?;
    ctx.claim_capability(capability, &channel_capability_name(port_id, channel_id))
}

/// Whether `capability` is the one the module claimed for exactly
/// `port_id`/`channel_id`.
pub fn authenticate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    capability: &Capability,
) -> bool {
    ctx.authenticate_capability(capability, &channel_capability_name(port_id, channel_id))
}

/// Looks up and authenticates the channel capability the module owns.
///
/// Fails with a permission error when the module does not own one.
pub fn channel_capability(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<Capability, RewardError> {
    let not_owned = || RewardError::CapabilityAuthentication {
        port_id: port_id.clone(),
        channel_id: channel_id.clone(),
    };

    let capability = ctx
        .get_capability(&channel_capability_name(port_id, channel_id))
        .ok_or_else(not_owned)?;

    if !authenticate(ctx, port_id, channel_id, &capability) {
        return Err(not_owned());
    }

    Ok(capability)
}

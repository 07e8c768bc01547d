//! The escrow accountant: balance effects of sending, acknowledging and
//! timing out a reward packet.
//!
//! Escrowed coins sit in the module account. The per-channel
//! [`EscrowRecord`] tracks how much of that is still in flight, so that every
//! debit is resolved exactly once, either by [`finalize_execute`] or by
//! [`reverse_execute`].
use cht_reward_types::error::RewardError;
use cht_reward_types::{Amount, Coin, EscrowPolicy, EscrowRecord, MODULE_ACCOUNT_NAME};
use ibc_core::host::types::identifiers::{ChannelId, PortId};
use ibc_core::primitives::prelude::*;
use ibc_core::primitives::Signer;

use crate::context::{RewardExecutionContext, RewardValidationContext};

/// The escrow record after `amount` more was debited into it.
pub fn record_debit(record: EscrowRecord, amount: Amount) -> Result<EscrowRecord, RewardError> {
    let in_flight = record
        .in_flight
        .checked_add(amount)
        .ok_or(RewardError::AmountOverflow)?;
    Ok(EscrowRecord { in_flight, ..record })
}

/// The escrow record after `amount` left the in-flight balance, either to be
/// finalized under `policy` or, with `policy` unset, to be credited back.
pub fn record_release(
    record: EscrowRecord,
    channel_id: &ChannelId,
    coin: &Coin,
    policy: Option<EscrowPolicy>,
) -> Result<EscrowRecord, RewardError> {
    let in_flight =
        record
            .in_flight
            .checked_sub(coin.amount)
            .ok_or_else(|| RewardError::EscrowUnderflow {
                channel_id: channel_id.clone(),
                denom: coin.denom.to_string(),
                in_escrow: record.in_flight.to_string(),
                requested: coin.amount.to_string(),
            })?;

    let locked = match policy {
        Some(EscrowPolicy::LockOnAck) => record
            .locked
            .checked_add(coin.amount)
            .ok_or(RewardError::AmountOverflow)?,
        Some(EscrowPolicy::BurnOnAck) | None => record.locked,
    };

    Ok(EscrowRecord { in_flight, locked })
}

pub fn debit_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    sender: &Signer,
    coin: &Coin,
) -> Result<(), RewardError> {
    if !ctx.params().send_enabled {
        return Err(RewardError::SendDisabled {
            reason: "reward transfers are disabled".to_string(),
        });
    }

    if !ctx.is_send_enabled(&coin.denom) {
        return Err(RewardError::SendDisabled {
            reason: format!("{} transfers are disabled", coin.denom),
        });
    }

    let module_address = ctx.module_address(MODULE_ACCOUNT_NAME);
    if ctx.is_blocked_address(&module_address) {
        return Err(RewardError::BlockedAddress {
            address: module_address.to_string(),
        });
    }

    let available = ctx.balance(sender, &coin.denom)?;
    if available < coin.amount {
        return Err(RewardError::InsufficientFunds {
            send_attempt: coin.to_string(),
            available_funds: Coin::new(coin.denom.clone(), available).to_string(),
        });
    }

    record_debit(ctx.escrow_record(port_id, channel_id, &coin.denom), coin.amount)?;

    Ok(())
}

/// Moves `coin` from `sender` into the channel's escrow.
pub fn debit_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    sender: &Signer,
    coin: &Coin,
) -> Result<(), RewardError> {
    let record = record_debit(ctx.escrow_record(port_id, channel_id, &coin.denom), coin.amount)?;
    ctx.send_coins_from_account_to_module(sender, MODULE_ACCOUNT_NAME, coin)?;
    ctx.store_escrow_record(port_id, channel_id, &coin.denom, record)
}

pub fn finalize_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    coin: &Coin,
) -> Result<(), RewardError> {
    let policy = ctx.params().escrow_policy;
    record_release(
        ctx.escrow_record(port_id, channel_id, &coin.denom),
        channel_id,
        coin,
        Some(policy),
    )?;

    if policy == EscrowPolicy::BurnOnAck {
        let module_address = ctx.module_address(MODULE_ACCOUNT_NAME);
        if ctx.balance(&module_address, &coin.denom)? < coin.amount {
            return Err(RewardError::host(format!(
                "module account cannot cover the burn of {coin}"
            )));
        }
    }

    Ok(())
}

/// Removes `coin` from escrow for good, burning it or locking it against the
/// channel depending on the module's escrow policy.
pub fn finalize_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    coin: &Coin,
) -> Result<(), RewardError> {
    let policy = ctx.params().escrow_policy;
    let record = record_release(
        ctx.escrow_record(port_id, channel_id, &coin.denom),
        channel_id,
        coin,
        Some(policy),
    )?;

    if policy == EscrowPolicy::BurnOnAck {
        ctx.burn_coins(MODULE_ACCOUNT_NAME, coin)?;
    }

    ctx.store_escrow_record(port_id, channel_id, &coin.denom, record)
}

pub fn reverse_validate(
    ctx: &impl RewardValidationContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    coin: &Coin,
) -> Result<(), RewardError> {
    record_release(
        ctx.escrow_record(port_id, channel_id, &coin.denom),
        channel_id,
        coin,
        None,
    )?;

    let module_address = ctx.module_address(MODULE_ACCOUNT_NAME);
    if ctx.balance(&module_address, &coin.denom)? < coin.amount {
        return Err(RewardError::host(format!(
            "module account cannot cover the refund of {coin}"
        )));
    }

    Ok(())
}

/// Credits `coin` back to `sender` out of the channel's escrow.
pub fn reverse_execute(
    ctx: &mut impl RewardExecutionContext,
    port_id: &PortId,
    channel_id: &ChannelId,
    sender: &Signer,
    coin: &Coin,
) -> Result<(), RewardError> {
    let record = record_release(
        ctx.escrow_record(port_id, channel_id, &coin.denom),
        channel_id,
        coin,
        None,
    )?;
    ctx.send_coins_from_module_to_account(MODULE_ACCOUNT_NAME, sender, coin)?;
    ctx.store_escrow_record(port_id, channel_id, &coin.denom, record)
}

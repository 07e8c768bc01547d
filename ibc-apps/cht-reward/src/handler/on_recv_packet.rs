use cht_reward_types::error::RewardError;
use cht_reward_types::packet::RewardPacketData;
use cht_reward_types::{Coin, MODULE_ACCOUNT_NAME};
use ibc_core::channel::types::packet::Packet;
use ibc_core::primitives::prelude::*;
use ibc_core::router::types::module::ModuleExtras;

use crate::context::{RewardExecutionContext, RewardValidationContext};

/// The voucher a receiving chain credits for `data` arriving through the
/// destination end of `packet`.
pub fn voucher_coin(packet: &Packet, data: &RewardPacketData) -> Result<Coin, RewardError> {
    let coin = data.coin()?;
    Ok(Coin::new(
        coin.denom.voucher(&packet.port_id_on_b, &packet.chan_id_on_b),
        coin.amount,
    ))
}

/// Checks that the reward carried by `data` may be credited to its receiver.
pub fn process_recv_packet_validate(
    ctx_b: &impl RewardValidationContext,
    packet: &Packet,
    data: &RewardPacketData,
) -> Result<(), RewardError> {
    if !ctx_b.params().receive_enabled {
        return Err(RewardError::ReceiveDisabled {
            reason: "reward transfers are disabled".to_string(),
        });
    }

    if ctx_b.is_blocked_address(&data.receiver) {
        return Err(RewardError::BlockedAddress {
            address: data.receiver.to_string(),
        });
    }

    let voucher = voucher_coin(packet, data)?;

    // Both the module account and the receiver must be able to hold the voucher.
    let module_address = ctx_b.module_address(MODULE_ACCOUNT_NAME);
    for account in [&module_address, &data.receiver] {
        ctx_b
            .balance(account, &voucher.denom)?
            .checked_add(voucher.amount)
            .ok_or(RewardError::AmountOverflow)?;
    }

    Ok(())
}

/// This function handles the reward receiving logic.
///
/// The validation runs here rather than in a separate callback: a packet the
/// application refuses is still received, and the refusal travels back as an
/// error acknowledgement so that the source chain refunds the delegator.
pub fn process_recv_packet_execute<Ctx: RewardExecutionContext>(
    ctx_b: &mut Ctx,
    packet: &Packet,
    data: RewardPacketData,
) -> Result<ModuleExtras, (ModuleExtras, RewardError)> {
    process_recv_packet_validate(ctx_b, packet, &data).map_err(|err| (ModuleExtras::empty(), err))?;

    let voucher = voucher_coin(packet, &data).map_err(|err| (ModuleExtras::empty(), err))?;

    let mut extras = ModuleExtras::empty();
    let needs_account = !ctx_b.has_account(&data.receiver);

    ctx_b
        .mint_coins(MODULE_ACCOUNT_NAME, &voucher)
        .map_err(|err| (extras.clone(), err))?;
    if let Err(err) =
        ctx_b.send_coins_from_module_to_account(MODULE_ACCOUNT_NAME, &data.receiver, &voucher)
    {
        ctx_b
            .burn_coins(MODULE_ACCOUNT_NAME, &voucher)
            .map_err(|err| (extras.clone(), err))?;
        return Err((extras, err));
    }

    if needs_account {
        ctx_b
            .new_account_with_address(&data.receiver)
            .map_err(|err| (extras.clone(), err))?;
        extras
            .log
            .push(format!("created account {} for incoming rewards", data.receiver));
    }

    extras.log.push(format!(
        "credited {voucher} to {} for the rewards of {}",
        data.receiver,
        data.snapshot.delegator()
    ));

    ctx_b
        .store_received_snapshot(&packet.port_id_on_b, &packet.chan_id_on_b, data.snapshot)
        .map_err(|err| (extras.clone(), err))?;

    Ok(extras)
}

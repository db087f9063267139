//! Mutating command handlers
//!
//! Each handler loads the world snapshot, rebuilds the engine, runs exactly
//! one engine operation, and persists the resulting world. Engine rejections
//! surface as the engine's named error; the snapshot is only rewritten on
//! success.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use pegmint_engine::{AccountId, AssetId, Engine, UNIT_DECIMALS};

use crate::amount::{format_health_factor, parse_amount};
use crate::world::{Handles, WorldState};

fn run_op(
    state_path: &Path,
    op: impl FnOnce(&mut Engine, &Handles) -> Result<String>,
) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let (mut engine, handles) = world.build()?;
    let summary = op(&mut engine, &handles)?;
    world.capture(&engine, &handles).save(state_path)?;
    println!("{} {}", "ok:".bright_green().bold(), summary);
    Ok(())
}

pub fn deposit(state_path: &Path, account: &str, asset: &str, amount: &str) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let raw = parse_amount(amount, world.decimals_of(asset)?)?;
    run_op(state_path, |engine, _| {
        engine.deposit_collateral(AccountId::from_label(account), AssetId::from_label(asset), raw)?;
        Ok(format!("deposited {amount} {asset} for {account}"))
    })
}

pub fn redeem(state_path: &Path, account: &str, asset: &str, amount: &str) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let raw = parse_amount(amount, world.decimals_of(asset)?)?;
    run_op(state_path, |engine, _| {
        engine.redeem_collateral(AccountId::from_label(account), AssetId::from_label(asset), raw)?;
        Ok(format!("redeemed {amount} {asset} for {account}"))
    })
}

pub fn mint(state_path: &Path, account: &str, amount: &str) -> Result<()> {
    let raw = parse_amount(amount, UNIT_DECIMALS)?;
    run_op(state_path, |engine, _| {
        let id = AccountId::from_label(account);
        engine.mint_debt(id, raw)?;
        let hf = engine.health_factor(id)?;
        Ok(format!(
            "minted {amount} for {account} (health factor {})",
            format_health_factor(hf)
        ))
    })
}

pub fn burn(state_path: &Path, account: &str, amount: &str) -> Result<()> {
    let raw = parse_amount(amount, UNIT_DECIMALS)?;
    run_op(state_path, |engine, _| {
        engine.burn_debt(AccountId::from_label(account), raw)?;
        Ok(format!("burned {amount} for {account}"))
    })
}

pub fn deposit_and_mint(
    state_path: &Path,
    account: &str,
    asset: &str,
    amount: &str,
    mint_amount: &str,
) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let raw = parse_amount(amount, world.decimals_of(asset)?)?;
    let raw_mint = parse_amount(mint_amount, UNIT_DECIMALS)?;
    run_op(state_path, |engine, _| {
        let id = AccountId::from_label(account);
        engine.deposit_and_mint(id, AssetId::from_label(asset), raw, raw_mint)?;
        let hf = engine.health_factor(id)?;
        Ok(format!(
            "deposited {amount} {asset} and minted {mint_amount} for {account} (health factor {})",
            format_health_factor(hf)
        ))
    })
}

pub fn redeem_for_burn(
    state_path: &Path,
    account: &str,
    asset: &str,
    redeem_amount: &str,
    burn_amount: &str,
) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let raw_redeem = parse_amount(redeem_amount, world.decimals_of(asset)?)?;
    let raw_burn = parse_amount(burn_amount, UNIT_DECIMALS)?;
    run_op(state_path, |engine, _| {
        engine.redeem_for_burn(
            AccountId::from_label(account),
            AssetId::from_label(asset),
            raw_redeem,
            raw_burn,
        )?;
        Ok(format!(
            "burned {burn_amount} and redeemed {redeem_amount} {asset} for {account}"
        ))
    })
}

pub fn liquidate(
    state_path: &Path,
    liquidator: &str,
    asset: &str,
    target: &str,
    debt_to_cover: &str,
) -> Result<()> {
    let raw = parse_amount(debt_to_cover, UNIT_DECIMALS)?;
    run_op(state_path, |engine, _| {
        let target_id = AccountId::from_label(target);
        engine.liquidate(
            AccountId::from_label(liquidator),
            AssetId::from_label(asset),
            target_id,
            raw,
        )?;
        let hf = engine.health_factor(target_id)?;
        Ok(format!(
            "{liquidator} covered {debt_to_cover} of {target}'s debt (target health factor now {})",
            format_health_factor(hf)
        ))
    })
}

pub fn set_price(state_path: &Path, asset: &str, price: &str) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let slot = world
        .assets
        .iter()
        .position(|a| a.symbol == asset)
        .ok_or_else(|| anyhow::anyhow!("unknown asset: {asset}"))?;
    let raw = parse_amount(price, world.assets[slot].oracle_decimals)?;
    let updated_at = world.assets[slot].price_updated_at + 1;
    run_op(state_path, |_, handles| {
        handles.oracles[slot].set_price(raw, updated_at);
        Ok(format!("{asset} price set to {price}"))
    })
}

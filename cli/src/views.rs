//! Read-only command handlers

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use pegmint_engine::{AccountId, AssetId, SyntheticUnit, TokenLedger, MIN_HEALTH_FACTOR, UNIT_DECIMALS};

use crate::amount::{format_amount, format_health_factor};
use crate::world::WorldState;

/// Print one account's positions, debt, collateral value and health factor.
pub fn account(state_path: &Path, name: &str) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let (engine, handles) = world.build()?;
    let id = AccountId::from_label(name);

    println!("{}", format!("=== Account {name} ===").bright_green().bold());
    for (slot, asset) in world.assets.iter().enumerate() {
        let position = engine.ledger().collateral_of(id, AssetId::from_label(&asset.symbol));
        let wallet = handles.tokens[slot].balance_of(id);
        println!(
            "  {} {}: deposited {}, wallet {}",
            "collateral".bright_cyan(),
            asset.symbol,
            format_amount(position, asset.decimals),
            format_amount(wallet, asset.decimals),
        );
    }
    let info = engine.account_information(id)?;
    println!(
        "  {} {}",
        "synthetic balance:".bright_cyan(),
        format_amount(handles.synthetic.balance_of(id), UNIT_DECIMALS)
    );
    println!(
        "  {} {}",
        "collateral value:".bright_cyan(),
        format_amount(info.collateral_value, UNIT_DECIMALS)
    );
    println!("  {} {}", "debt:".bright_cyan(), format_amount(info.debt, UNIT_DECIMALS));
    let hf = engine.health_factor(id)?;
    let rendered = format_health_factor(hf);
    if hf < MIN_HEALTH_FACTOR {
        println!("  {} {}", "health factor:".bright_cyan(), rendered.bright_red().bold());
    } else {
        println!("  {} {}", "health factor:".bright_cyan(), rendered.bright_green());
    }
    Ok(())
}

/// Keeper-style sweep: list every account below the minimum health factor.
pub fn scan(state_path: &Path) -> Result<()> {
    let world = WorldState::load(state_path)?;
    let (engine, _) = world.build()?;

    println!("{}", "=== Liquidatable Accounts ===".bright_green().bold());
    let mut found = 0;
    for account in engine.ledger().accounts() {
        let hf = engine.health_factor(account)?;
        if hf < MIN_HEALTH_FACTOR {
            found += 1;
            let info = engine.account_information(account)?;
            println!(
                "  {} health factor {}, debt {}, collateral value {}",
                account.label().bright_yellow(),
                format_health_factor(hf).bright_red().bold(),
                format_amount(info.debt, UNIT_DECIMALS),
                format_amount(info.collateral_value, UNIT_DECIMALS),
            );
        }
    }
    if found == 0 {
        println!("{}", "  none".dimmed());
    }
    Ok(())
}

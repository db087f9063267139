//! Pegmint CLI - local simulation and scenario driver
//!
//! Drives the collateral/debt engine against an in-memory world (token
//! ledgers, synthetic unit, oracles) persisted as a JSON snapshot between
//! invocations. Useful for walking through deposit/mint/liquidation
//! scenarios without any external infrastructure.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod amount;
mod config;
mod ops;
mod views;
mod world;

use config::ScenarioConfig;
use world::WorldState;

#[derive(Parser)]
#[command(name = "pegmint")]
#[command(about = "Collateralized-debt engine simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the world state snapshot
    #[arg(short, long, default_value = "pegmint-state.json")]
    state: PathBuf,

    /// Verbose output (engine operation log)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh world from a TOML scenario file
    Init {
        /// Scenario file defining assets, prices and account balances
        #[arg(short, long, default_value = "pegmint.toml")]
        scenario: PathBuf,
    },

    /// Deposit collateral
    Deposit {
        account: String,
        asset: String,
        /// Amount in asset units, e.g. "1.5"
        amount: String,
    },

    /// Redeem collateral
    Redeem {
        account: String,
        asset: String,
        amount: String,
    },

    /// Mint synthetic units against deposited collateral
    Mint {
        account: String,
        /// Amount in unit-of-account, e.g. "10000"
        amount: String,
    },

    /// Burn synthetic units to reduce debt
    Burn {
        account: String,
        amount: String,
    },

    /// Deposit collateral and mint in one atomic operation
    DepositMint {
        account: String,
        asset: String,
        amount: String,
        mint_amount: String,
    },

    /// Burn debt and redeem collateral in one atomic operation
    RedeemBurn {
        account: String,
        asset: String,
        redeem_amount: String,
        burn_amount: String,
    },

    /// Liquidate an undercollateralized account
    Liquidate {
        liquidator: String,
        asset: String,
        target: String,
        /// Portion of the target's debt to repay, in unit-of-account
        debt_to_cover: String,
    },

    /// Move an oracle price (to set up liquidation scenarios)
    SetPrice {
        asset: String,
        price: String,
    },

    /// Show an account's positions, debt and health factor
    Account {
        name: String,
    },

    /// List accounts below the minimum health factor
    Scan,
}

fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", "error:".bright_red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { scenario } => {
            let config = ScenarioConfig::load(scenario)?;
            let world = WorldState::from_scenario(&config)?;
            // Fail fast if the scenario produces an invalid registry.
            world.build()?;
            world.save(&cli.state)?;
            println!(
                "{} world with {} asset(s) written to {}",
                "ok:".bright_green().bold(),
                world.assets.len(),
                cli.state.display()
            );
            Ok(())
        }
        Commands::Deposit { account, asset, amount } => {
            ops::deposit(&cli.state, account, asset, amount)
        }
        Commands::Redeem { account, asset, amount } => {
            ops::redeem(&cli.state, account, asset, amount)
        }
        Commands::Mint { account, amount } => ops::mint(&cli.state, account, amount),
        Commands::Burn { account, amount } => ops::burn(&cli.state, account, amount),
        Commands::DepositMint { account, asset, amount, mint_amount } => {
            ops::deposit_and_mint(&cli.state, account, asset, amount, mint_amount)
        }
        Commands::RedeemBurn { account, asset, redeem_amount, burn_amount } => {
            ops::redeem_for_burn(&cli.state, account, asset, redeem_amount, burn_amount)
        }
        Commands::Liquidate { liquidator, asset, target, debt_to_cover } => {
            ops::liquidate(&cli.state, liquidator, asset, target, debt_to_cover)
        }
        Commands::SetPrice { asset, price } => ops::set_price(&cli.state, asset, price),
        Commands::Account { name } => views::account(&cli.state, name),
        Commands::Scan => views::scan(&cli.state),
    }
}

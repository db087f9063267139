//! Persisted simulation world
//!
//! The whole simulated world — oracle prices, external token balances,
//! synthetic-unit balances, and the engine's ledger — is captured as a JSON
//! snapshot between invocations. Each command rebuilds the engine and its
//! in-memory collaborators from the snapshot, runs one operation, and
//! captures the result back.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pegmint_engine::{
    AccountId, AssetConfig, AssetId, Engine, MemOracle, MemSyntheticUnit, MemTokenLedger,
    PriceOracle, SyntheticUnit, TokenLedger,
};

use crate::amount::parse_amount;
use crate::config::ScenarioConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceState {
    pub account: String,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetState {
    pub symbol: String,
    pub decimals: u32,
    pub oracle_decimals: u32,
    pub price: u128,
    pub price_updated_at: u64,
    pub balances: Vec<BalanceState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionState {
    pub account: String,
    pub asset: String,
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub vault: String,
    pub assets: Vec<AssetState>,
    pub synthetic_balances: Vec<BalanceState>,
    pub positions: Vec<PositionState>,
    pub debts: Vec<BalanceState>,
}

/// Handles to the in-memory collaborators, kept alongside the engine so the
/// driver can inspect and re-capture their state.
pub struct Handles {
    pub tokens: Vec<Arc<MemTokenLedger>>,
    pub oracles: Vec<Arc<MemOracle>>,
    pub synthetic: Arc<MemSyntheticUnit>,
}

impl WorldState {
    pub fn from_scenario(config: &ScenarioConfig) -> Result<Self> {
        let mut assets = Vec::new();
        for def in &config.assets {
            let price = parse_amount(&def.price, def.oracle_decimals)
                .with_context(|| format!("asset {}: bad price", def.symbol))?;
            let mut balances = Vec::new();
            for account in &config.accounts {
                if let Some(raw) = account.balances.get(&def.symbol) {
                    let amount = parse_amount(raw, def.decimals).with_context(|| {
                        format!("account {}: bad {} balance", account.name, def.symbol)
                    })?;
                    balances.push(BalanceState { account: account.name.clone(), amount });
                }
            }
            assets.push(AssetState {
                symbol: def.symbol.clone(),
                decimals: def.decimals,
                oracle_decimals: def.oracle_decimals,
                price,
                price_updated_at: 0,
                balances,
            });
        }
        Ok(Self {
            vault: config.vault.clone(),
            assets,
            synthetic_balances: Vec::new(),
            positions: Vec::new(),
            debts: Vec::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read state file: {} (run init first)", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse state file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        fs::write(path, text)
            .with_context(|| format!("failed to write state file: {}", path.display()))
    }

    pub fn decimals_of(&self, symbol: &str) -> Result<u32> {
        self.assets
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.decimals)
            .with_context(|| format!("unknown asset: {symbol}"))
    }

    /// Rebuild the engine and its collaborators from this snapshot.
    pub fn build(&self) -> Result<(Engine, Handles)> {
        let mut configs = Vec::new();
        let mut tokens = Vec::new();
        let mut oracles = Vec::new();
        for asset in &self.assets {
            configs.push(AssetConfig {
                asset: AssetId::from_label(&asset.symbol),
                decimals: asset.decimals,
                oracle_decimals: asset.oracle_decimals,
            });
            let token = Arc::new(MemTokenLedger::new());
            for balance in &asset.balances {
                token.set_balance(AccountId::from_label(&balance.account), balance.amount);
            }
            tokens.push(token);
            oracles.push(Arc::new(MemOracle::new(asset.price, asset.price_updated_at)));
        }
        let synthetic = Arc::new(MemSyntheticUnit::new());
        for balance in &self.synthetic_balances {
            synthetic.set_balance(AccountId::from_label(&balance.account), balance.amount);
        }
        let positions = self
            .positions
            .iter()
            .map(|p| {
                (
                    AccountId::from_label(&p.account),
                    AssetId::from_label(&p.asset),
                    p.amount,
                )
            })
            .collect();
        let debts = self
            .debts
            .iter()
            .map(|d| (AccountId::from_label(&d.account), d.amount))
            .collect();
        let engine = Engine::restore(
            AccountId::from_label(&self.vault),
            configs,
            oracles.iter().map(|o| Arc::clone(o) as Arc<dyn PriceOracle>).collect(),
            tokens.iter().map(|t| Arc::clone(t) as Arc<dyn TokenLedger>).collect(),
            Arc::clone(&synthetic) as Arc<dyn SyntheticUnit>,
            positions,
            debts,
        )?;
        Ok((engine, Handles { tokens, oracles, synthetic }))
    }

    /// Capture the post-operation world back into a snapshot.
    pub fn capture(&self, engine: &Engine, handles: &Handles) -> Self {
        let assets = self
            .assets
            .iter()
            .enumerate()
            .map(|(slot, asset)| {
                let price = handles.oracles[slot].latest_price();
                AssetState {
                    symbol: asset.symbol.clone(),
                    decimals: asset.decimals,
                    oracle_decimals: asset.oracle_decimals,
                    price: price.price,
                    price_updated_at: price.updated_at,
                    balances: handles.tokens[slot]
                        .balances()
                        .into_iter()
                        .filter(|&(_, amount)| amount > 0)
                        .map(|(account, amount)| BalanceState {
                            account: account.label().to_string(),
                            amount,
                        })
                        .collect(),
                }
            })
            .collect();
        let synthetic_balances = handles
            .synthetic
            .balances()
            .into_iter()
            .filter(|&(_, amount)| amount > 0)
            .map(|(account, amount)| BalanceState { account: account.label().to_string(), amount })
            .collect();
        let mut positions: Vec<PositionState> = engine
            .ledger()
            .positions()
            .map(|(account, asset, amount)| PositionState {
                account: account.label().to_string(),
                asset: asset.label().to_string(),
                amount,
            })
            .collect();
        positions.sort_by(|a, b| (&a.account, &a.asset).cmp(&(&b.account, &b.asset)));
        let mut debts: Vec<BalanceState> = engine
            .ledger()
            .debtors()
            .map(|(account, amount)| BalanceState { account: account.label().to_string(), amount })
            .collect();
        debts.sort_by(|a, b| a.account.cmp(&b.account));
        Self {
            vault: self.vault.clone(),
            assets,
            synthetic_balances,
            positions,
            debts,
        }
    }
}

//! Scenario configuration
//!
//! A TOML scenario file describes the world to simulate: the collateral
//! assets with their decimal configuration and starting oracle prices, and
//! the accounts with their starting token balances. `init` turns this into
//! a persisted world snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Engine vault account on the external ledgers.
    #[serde(default = "default_vault")]
    pub vault: String,
    pub assets: Vec<AssetDef>,
    #[serde(default)]
    pub accounts: Vec<AccountDef>,
}

fn default_vault() -> String {
    "engine-vault".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AssetDef {
    pub symbol: String,
    pub decimals: u32,
    pub oracle_decimals: u32,
    /// Starting oracle price, a decimal string in quote units per asset
    /// unit (e.g. "2000" for $2000), scaled by `oracle_decimals`.
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountDef {
    pub name: String,
    /// Starting token balances per asset symbol, decimal strings scaled by
    /// each asset's `decimals`.
    #[serde(default)]
    pub balances: BTreeMap<String, String>,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
        let config: ScenarioConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse scenario file: {}", path.display()))?;
        if config.assets.is_empty() {
            anyhow::bail!("scenario defines no assets");
        }
        Ok(config)
    }
}

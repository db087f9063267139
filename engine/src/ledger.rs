//! The collateral/debt ledger
//!
//! Single source of truth for per-(account, asset) collateral positions and
//! per-account minted debt, plus the immutable asset registry fixed at
//! construction. The ledger exclusively owns both maps: only the engine
//! mutates them, through the crate-private credit/debit methods below.
//! Entries exist implicitly from first write and are only ever zeroed,
//! never deleted.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::id::{AccountId, AssetId};

/// Registry entry for one accepted collateral asset.
///
/// `decimals` is the asset's native decimal count; `oracle_decimals` is the
/// decimal count of its bound price feed. Both are explicit, per-asset
/// configuration rather than a global constant, so heterogeneous assets and
/// feeds account correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetConfig {
    pub asset: AssetId,
    pub decimals: u32,
    pub oracle_decimals: u32,
}

#[derive(Debug, Default)]
pub struct Ledger {
    registry: Vec<AssetConfig>,
    collateral: HashMap<(AccountId, AssetId), u128>,
    debt: HashMap<AccountId, u128>,
}

impl Ledger {
    pub(crate) fn new(registry: Vec<AssetConfig>) -> Self {
        Self {
            registry,
            collateral: HashMap::new(),
            debt: HashMap::new(),
        }
    }

    /// The allowlist, in construction order. Small (single-digit asset
    /// count); a flat ordered sequence is all the indexing required.
    pub fn registry(&self) -> &[AssetConfig] {
        &self.registry
    }

    /// Registry slot of `asset`, if it is on the allowlist.
    pub fn slot_of(&self, asset: AssetId) -> Option<usize> {
        self.registry.iter().position(|cfg| cfg.asset == asset)
    }

    pub fn collateral_of(&self, account: AccountId, asset: AssetId) -> u128 {
        self.collateral.get(&(account, asset)).copied().unwrap_or(0)
    }

    pub fn debt_of(&self, account: AccountId) -> u128 {
        self.debt.get(&account).copied().unwrap_or(0)
    }

    /// Every non-zero collateral position.
    pub fn positions(&self) -> impl Iterator<Item = (AccountId, AssetId, u128)> + '_ {
        self.collateral
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|(&(account, asset), &amount)| (account, asset, amount))
    }

    /// Every account with outstanding minted debt.
    pub fn debtors(&self) -> impl Iterator<Item = (AccountId, u128)> + '_ {
        self.debt
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|(&account, &amount)| (account, amount))
    }

    /// Every account the ledger has seen, deduplicated and ordered.
    pub fn accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self
            .collateral
            .keys()
            .map(|&(account, _)| account)
            .chain(self.debt.keys().copied())
            .collect();
        accounts.sort();
        accounts.dedup();
        accounts
    }

    pub(crate) fn credit_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let entry = self.collateral.entry((account, asset)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Decrement a collateral position. Decrementing past the deposited
    /// balance is a named rejection, never a clamp.
    pub(crate) fn debit_collateral(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u128,
    ) -> Result<(), EngineError> {
        let have = self.collateral_of(account, asset);
        if amount > have {
            return Err(EngineError::InsufficientCollateral { have, need: amount });
        }
        self.collateral.insert((account, asset), have - amount);
        Ok(())
    }

    pub(crate) fn credit_debt(&mut self, account: AccountId, amount: u128) -> Result<(), EngineError> {
        let entry = self.debt.entry(account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Decrement minted debt. Burning more than was minted is a named
    /// rejection, never a clamp.
    pub(crate) fn debit_debt(&mut self, account: AccountId, amount: u128) -> Result<(), EngineError> {
        let outstanding = self.debt_of(account);
        if amount > outstanding {
            return Err(EngineError::BurnExceedsDebt {
                requested: amount,
                outstanding,
            });
        }
        self.debt.insert(account, outstanding - amount);
        Ok(())
    }
}

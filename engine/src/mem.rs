//! In-memory collaborator implementations
//!
//! Reference implementations of the external capability traits, used by the
//! CLI's local simulation and by every test tier. Balances and prices live
//! behind mutexes so handles can be shared with the engine via `Arc` while
//! the harness keeps its own handle for seeding, inspection, and failure
//! injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::external::{OraclePrice, PriceOracle, SyntheticUnit, TokenLedger, TransferError};
use crate::id::AccountId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("collaborator lock poisoned")
}

fn move_balance(
    balances: &mut HashMap<AccountId, u128>,
    from: AccountId,
    to: AccountId,
    amount: u128,
) -> Result<(), TransferError> {
    let have = balances.get(&from).copied().unwrap_or(0);
    if amount > have {
        return Err(TransferError::InsufficientBalance { have, need: amount });
    }
    balances.insert(from, have - amount);
    *balances.entry(to).or_insert(0) += amount;
    Ok(())
}

/// In-memory transferable balance ledger for one collateral asset.
#[derive(Debug, Default)]
pub struct MemTokenLedger {
    balances: Mutex<HashMap<AccountId, u128>>,
    fail_next: AtomicBool,
}

impl MemTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, account: AccountId, amount: u128) {
        lock(&self.balances).insert(account, amount);
    }

    /// Reject the next transfer, then recover. For exercising rollback
    /// paths.
    pub fn fail_next_transfer(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn balances(&self) -> Vec<(AccountId, u128)> {
        let mut entries: Vec<_> = lock(&self.balances)
            .iter()
            .map(|(&account, &amount)| (account, amount))
            .collect();
        entries.sort();
        entries
    }
}

impl TokenLedger for MemTokenLedger {
    fn transfer_from(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("injected failure".to_string()));
        }
        move_balance(&mut lock(&self.balances), from, to, amount)
    }

    fn balance_of(&self, account: AccountId) -> u128 {
        lock(&self.balances).get(&account).copied().unwrap_or(0)
    }
}

/// In-memory pegged synthetic unit with a tracked total supply.
#[derive(Debug, Default)]
pub struct MemSyntheticUnit {
    balances: Mutex<HashMap<AccountId, u128>>,
    total_supply: Mutex<u128>,
    fail_next_mint: AtomicBool,
    fail_next_transfer: AtomicBool,
}

impl MemSyntheticUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, account: AccountId, amount: u128) {
        lock(&self.balances).insert(account, amount);
    }

    pub fn total_supply(&self) -> u128 {
        *lock(&self.total_supply)
    }

    pub fn fail_next_mint(&self) {
        self.fail_next_mint.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_transfer(&self) {
        self.fail_next_transfer.store(true, Ordering::SeqCst);
    }

    pub fn balances(&self) -> Vec<(AccountId, u128)> {
        let mut entries: Vec<_> = lock(&self.balances)
            .iter()
            .map(|(&account, &amount)| (account, amount))
            .collect();
        entries.sort();
        entries
    }
}

impl SyntheticUnit for MemSyntheticUnit {
    fn mint(&self, account: AccountId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next_mint.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("injected mint failure".to_string()));
        }
        *lock(&self.balances).entry(account).or_insert(0) += amount;
        *lock(&self.total_supply) += amount;
        Ok(())
    }

    fn burn(&self, account: AccountId, amount: u128) -> Result<(), TransferError> {
        let mut balances = lock(&self.balances);
        let have = balances.get(&account).copied().unwrap_or(0);
        if amount > have {
            return Err(TransferError::InsufficientBalance { have, need: amount });
        }
        balances.insert(account, have - amount);
        *lock(&self.total_supply) -= amount;
        Ok(())
    }

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), TransferError> {
        if self.fail_next_transfer.swap(false, Ordering::SeqCst) {
            return Err(TransferError::Rejected("injected transfer failure".to_string()));
        }
        move_balance(&mut lock(&self.balances), from, to, amount)
    }

    fn balance_of(&self, account: AccountId) -> u128 {
        lock(&self.balances).get(&account).copied().unwrap_or(0)
    }
}

/// In-memory price oracle with a settable price.
#[derive(Debug)]
pub struct MemOracle {
    price: Mutex<OraclePrice>,
}

impl MemOracle {
    pub fn new(price: u128, updated_at: u64) -> Self {
        Self {
            price: Mutex::new(OraclePrice { price, updated_at }),
        }
    }

    pub fn set_price(&self, price: u128, updated_at: u64) {
        *lock(&self.price) = OraclePrice { price, updated_at };
    }
}

impl PriceOracle for MemOracle {
    fn latest_price(&self) -> OraclePrice {
        *lock(&self.price)
    }
}

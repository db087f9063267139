//! Capability interfaces for external collaborators
//!
//! The engine talks to three kinds of external ledgers: one transferable
//! balance ledger per collateral asset, the pegged synthetic unit (of which
//! the engine is the sole authorized mint/burn controller), and one price
//! oracle per asset. Each call returns a `Result` carrying a reason, never a
//! bare bool, so failures stay diagnosable at the engine boundary.
//!
//! The engine is an authorized operator on every ledger it controls: it may
//! move balances it has just delivered when unwinding a partially applied
//! operation.

use crate::id::AccountId;
use thiserror::Error;

/// Failure reported by an external balance ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// A transferable balance ledger for one collateral asset.
pub trait TokenLedger: Send + Sync {
    /// Move `amount` from `from` to `to`. The engine is an authorized
    /// operator for every account it interacts with.
    fn transfer_from(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), TransferError>;

    fn balance_of(&self, account: AccountId) -> u128;
}

/// The pegged synthetic unit. The engine is its sole mint/burn controller.
pub trait SyntheticUnit: Send + Sync {
    /// Create `amount` new units credited to `account`.
    fn mint(&self, account: AccountId, amount: u128) -> Result<(), TransferError>;

    /// Destroy `amount` units held by `account`.
    fn burn(&self, account: AccountId, amount: u128) -> Result<(), TransferError>;

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), TransferError>;

    fn balance_of(&self, account: AccountId) -> u128;
}

/// A price read from an oracle, in the oracle's native decimal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: u128,
    pub updated_at: u64,
}

/// External price source, bound one-to-one with a collateral asset.
///
/// A single synchronous, trusted read per call. Staleness checking and
/// multi-oracle aggregation are deliberately out of scope.
pub trait PriceOracle: Send + Sync {
    fn latest_price(&self) -> OraclePrice;
}

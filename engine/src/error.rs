//! Engine error taxonomy
//!
//! Every failure condition is a distinct, named variant so callers and tests
//! can assert on the exact rejection. All errors reject the whole operation:
//! no partial state is ever committed.

use crate::external::TransferError;
use crate::id::AssetId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input validation: amounts must be strictly positive.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Input validation: the asset is not on the allowlist.
    #[error("asset {0} is not on the allowlist")]
    UnknownAsset(AssetId),

    /// Construction: parallel registry sequences disagree.
    #[error("registry configuration mismatch: {0}")]
    MismatchedRegistryConfig(String),

    /// The external collateral ledger refused a transfer.
    #[error("collateral transfer failed: {0}")]
    CollateralTransferFailed(TransferError),

    /// The synthetic-unit ledger refused a mint.
    #[error("synthetic mint failed: {0}")]
    SyntheticMintFailed(TransferError),

    /// The synthetic-unit ledger refused a burn.
    #[error("synthetic burn failed: {0}")]
    SyntheticBurnFailed(TransferError),

    /// The synthetic-unit ledger refused a transfer.
    #[error("synthetic transfer failed: {0}")]
    SyntheticTransferFailed(TransferError),

    /// A collateral decrement would exceed the deposited balance.
    #[error("insufficient collateral: have {have}, need {need}")]
    InsufficientCollateral { have: u128, need: u128 },

    /// A burn would exceed the outstanding minted debt.
    #[error("burn amount {requested} exceeds minted debt {outstanding}")]
    BurnExceedsDebt { requested: u128, outstanding: u128 },

    /// The acting account's health factor ended below the minimum.
    #[error("health factor {0} is below the minimum")]
    BrokenHealthFactor(u128),

    /// Liquidation precondition: the target is not liquidatable.
    #[error("target account is not liquidatable (health factor {0})")]
    TargetHealthy(u128),

    /// Liquidation postcondition: the target's health factor did not
    /// strictly improve.
    #[error("liquidation did not improve target health factor ({before} -> {after})")]
    HealthFactorNotImproved { before: u128, after: u128 },

    /// A nested call into a mutating entry point while one is in flight.
    #[error("reentrant call into a mutating entry point")]
    ReentrantCall,

    /// Checked fixed-point arithmetic overflowed.
    #[error("arithmetic overflow in fixed-point valuation")]
    ArithmeticOverflow,

    /// The oracle returned a zero price; valuation would divide by zero.
    #[error("oracle returned a zero price for asset {0}")]
    InvalidOraclePrice(AssetId),

    /// A compensating transfer was refused while unwinding a failed
    /// operation. The collaborator broke its operator contract; internal and
    /// external state may now disagree.
    #[error("rollback of a partially applied operation failed: {0}")]
    RollbackFailed(TransferError),
}

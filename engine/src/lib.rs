//! Collateralized-debt accounting engine
//!
//! Users deposit approved collateral assets, mint a pegged synthetic unit
//! against that collateral, and must keep their risk-adjusted collateral
//! value above a minimum multiple of their outstanding debt. When that
//! invariant breaks, any third party may forcibly close part of the position
//! in exchange for a collateral bonus, restoring solvency.
//!
//! The engine owns the collateral/debt ledger and talks to three kinds of
//! external collaborators through capability traits: one transferable
//! balance ledger per collateral asset, the synthetic unit (of which the
//! engine is the sole mint/burn controller), and one price oracle per asset.
//! Every mutating entry point is atomic: ledger effects and external calls
//! either all commit or are all unwound.

#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod external;
pub mod health;
pub mod id;
pub mod latch;
pub mod ledger;
pub mod math;
pub mod mem;

pub use engine::{AccountInformation, Engine};
pub use error::EngineError;
pub use external::{OraclePrice, PriceOracle, SyntheticUnit, TokenLedger, TransferError};
pub use health::{
    LIQUIDATION_THRESHOLD_PCT, LIQUIDATOR_BONUS_PCT, MAX_HEALTH_FACTOR, MIN_HEALTH_FACTOR,
};
pub use id::{AccountId, AssetId};
pub use ledger::{AssetConfig, Ledger};
pub use math::{PRECISION, UNIT_DECIMALS};
pub use mem::{MemOracle, MemSyntheticUnit, MemTokenLedger};

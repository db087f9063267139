//! Health-factor computation
//!
//! The health factor is derived, never stored: a pure function of the
//! account's outstanding debt and its risk-adjusted collateral value,
//! recomputed on demand after every mutation. Zero debt is unconditionally
//! safe and maps to the maximal value.

use crate::error::EngineError;
use crate::math::{self, PRECISION};

/// Share of nominal collateral value that counts toward solvency. 50 means
/// a mandatory minimum 200% nominal collateralization ratio.
pub const LIQUIDATION_THRESHOLD_PCT: u128 = 50;

/// Bonus collateral granted to a liquidator, as a percentage of the priced
/// seizure amount.
pub const LIQUIDATOR_BONUS_PCT: u128 = 10;

/// Health factor below which an account is liquidatable. Exactly 1.0 in
/// fixed point; equality is solvent, strictly below is broken.
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

/// Health factor of a debt-free account.
pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;

/// `(collateral_value * threshold / 100) * PRECISION / debt`, or maximal
/// when there is no debt.
pub fn health_factor(collateral_value: u128, debt: u128) -> Result<u128, EngineError> {
    if debt == 0 {
        return Ok(MAX_HEALTH_FACTOR);
    }
    let adjusted = math::pct(collateral_value, LIQUIDATION_THRESHOLD_PCT)
        .ok_or(EngineError::ArithmeticOverflow)?;
    math::mul_div(adjusted, PRECISION, debt).ok_or(EngineError::ArithmeticOverflow)
}

/// Strictly below the minimum is broken; equality at 1.0 is solvent.
pub fn is_broken(health_factor: u128) -> bool {
    health_factor < MIN_HEALTH_FACTOR
}

//! Fixed-point math utilities
//!
//! All internal accounting is done in 18-decimal fixed point over `u128`.
//! Every operation is checked: overflow and division by zero surface as
//! `None` and are mapped to a named engine error by the caller. Nothing in
//! the ledger ever wraps, saturates, or silently clamps.

/// Decimal count of the unit of account.
pub const UNIT_DECIMALS: u32 = 18;

/// Fixed-point precision of the unit of account (18 decimals).
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// `a * b / denom` with full checking. Returns `None` on overflow of the
/// intermediate product or when `denom` is zero.
#[inline]
pub fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    a.checked_mul(b)?.checked_div(denom)
}

/// `10^exp`, checked.
#[inline]
pub fn pow10(exp: u32) -> Option<u128> {
    10u128.checked_pow(exp)
}

/// Percentage of a value, checked: `value * pct / 100`.
#[inline]
pub fn pct(value: u128, pct: u128) -> Option<u128> {
    mul_div(value, pct, 100)
}

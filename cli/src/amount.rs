//! Decimal amount parsing and formatting
//!
//! Command-line amounts are human decimal strings ("1.5", "20000") scaled to
//! a fixed decimal count; ledger values are formatted back the same way.

use anyhow::{bail, Context, Result};

/// Parse a decimal string into a fixed-point integer with `decimals`
/// fractional digits. Rejects more fractional digits than the scale allows
/// rather than silently rounding.
pub fn parse_amount(input: &str, decimals: u32) -> Result<u128> {
    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        bail!("empty amount");
    }
    if frac.len() as u32 > decimals {
        bail!("amount {} has more than {} fractional digits", input, decimals);
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().with_context(|| format!("bad amount: {input}"))?
    };
    let frac_value: u128 = if frac.is_empty() {
        0
    } else {
        frac.parse().with_context(|| format!("bad amount: {input}"))?
    };
    let scale = 10u128
        .checked_pow(decimals)
        .context("decimal scale overflow")?;
    let frac_scale = 10u128
        .checked_pow(decimals - frac.len() as u32)
        .context("decimal scale overflow")?;
    whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value * frac_scale))
        .with_context(|| format!("amount {input} overflows"))
}

/// Format a fixed-point integer back to a decimal string, trimming trailing
/// fractional zeros.
pub fn format_amount(value: u128, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{frac:0width$}", width = decimals as usize);
    format!("{whole}.{}", frac_str.trim_end_matches('0'))
}

/// Render a health factor (18-decimal fixed point, `u128::MAX` for
/// debt-free accounts) with four decimal places.
pub fn format_health_factor(hf: u128) -> String {
    if hf == u128::MAX {
        return "max (no debt)".to_string();
    }
    let scale = 10u128.pow(18);
    let whole = hf / scale;
    let frac = (hf % scale) / 10u128.pow(14);
    format!("{whole}.{frac:04}")
}

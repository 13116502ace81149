//! Currency rounding and percentage helpers shared by every calculator.
//!
//! Whole-unit amounts round half away from zero, which is what a cashier
//! does; down payments are floored so the buyer is never asked for more
//! than the quoted fraction.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LotCalcError;
use crate::types::{Money, Percent, Rate};
use crate::LotCalcResult;

const HUNDRED: Decimal = dec!(100);

/// Round to whole currency units.
pub fn round_units(value: Money) -> Money {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate toward zero to whole currency units.
pub fn floor_units(value: Money) -> Money {
    value.trunc()
}

/// Round to the smallest currency unit (kopecks).
pub fn round_minor(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to `dp` decimal places.
pub fn round_pct(value: Percent, dp: u32) -> Percent {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a decimal rate to a percentage (0.125 -> 12.5).
pub fn rate_to_pct(rate: Rate) -> Percent {
    rate * HUNDRED
}

/// Convert a percentage to a decimal rate (12.5 -> 0.125).
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / HUNDRED
}

/// `part / whole * 100`. `whole` must be non-zero.
pub fn share_pct(part: Money, whole: Money, context: &str) -> LotCalcResult<Percent> {
    if whole.is_zero() {
        return Err(LotCalcError::InternalComputation {
            context: format!("{context}: division by zero"),
        });
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(HUNDRED))
        .ok_or_else(|| LotCalcError::overflow(context))
}

/// Multiplication that reports overflow instead of panicking.
pub fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LotCalcResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| LotCalcError::overflow(context))
}

/// Addition that reports overflow instead of panicking.
pub fn checked_add(a: Decimal, b: Decimal, context: &str) -> LotCalcResult<Decimal> {
    a.checked_add(b).ok_or_else(|| LotCalcError::overflow(context))
}

/// Reject zero and negative amounts before any computation.
pub fn require_positive(field: &str, value: Decimal) -> LotCalcResult<()> {
    if value <= Decimal::ZERO {
        return Err(LotCalcError::InvalidInput {
            field: field.into(),
            reason: format!("{field} must be positive, got {value}"),
        });
    }
    Ok(())
}

/// Group whole units with ASCII spaces: 6000000 -> "6 000 000".
pub fn format_money(value: Money) -> String {
    let rounded = round_units(value);
    let digits = rounded.abs().trunc().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.insert(0, '-');
    }
    out
}

/// Percentage with one decimal place: 898.66 -> "898.7%".
pub fn format_pct(value: Percent) -> String {
    format!("{:.1}%", round_pct(value, 1))
}

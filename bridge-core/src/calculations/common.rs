//! Helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a rate to `dp` decimal places using half-up rounding.
///
/// Exact midpoints round away from zero, so a combined acquisition rate of
/// `0.02335` becomes `0.0234` at four places.
///
/// # Examples
///
/// ```
/// use bridge_core::calculations::common::round_half_up;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_half_up(dec!(0.02335), 4), dec!(0.0234));
/// assert_eq!(round_half_up(dec!(0.023349), 4), dec!(0.0233));
/// assert_eq!(round_half_up(dec!(-0.00005), 4), dec!(-0.0001));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a percentage (e.g. `4.5`) into a fraction (`0.045`).
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

//! Level-payment (annuity) amortization, forward and inverse.
//!
//! With a monthly rate `r = annual% / 100 / 12` over `n` monthly periods:
//!
//! * payment from principal (PMT): `P · r · (1+r)^n / ((1+r)^n − 1)`
//! * principal from payment (PV): `A · ((1+r)^n − 1) / (r · (1+r)^n)`
//!
//! A zero rate degenerates to straight-line repayment, and zero periods
//! never divide: the full principal is due at once and no principal can be
//! supported by a payment stream of length zero.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::Manwon;
use crate::calculations::common::percent_to_fraction;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Converts an annual percentage rate into a monthly fractional rate.
pub fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    percent_to_fraction(annual_rate_pct) / MONTHS_PER_YEAR
}

/// `(1 + r)^n` by square-and-multiply, or `None` when it overflows.
///
/// Takes at most two multiplications per bit of `periods`.
fn compound_factor(
    monthly_rate: Decimal,
    periods: u32,
) -> Option<Decimal> {
    let mut base = Decimal::ONE + monthly_rate;
    let mut exp = periods;
    let mut factor = Decimal::ONE;
    while exp > 0 {
        if exp & 1 == 1 {
            factor = factor.checked_mul(base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(factor)
}

/// Level monthly payment that amortizes `principal` over `periods` months.
///
/// # Examples
///
/// ```
/// use bridge_core::calculations::amortization::monthly_payment;
/// use bridge_core::Manwon;
/// use rust_decimal_macros::dec;
///
/// // Interest-free: straight-line.
/// assert_eq!(
///     monthly_payment(dec!(0), 120, Manwon::new(dec!(12000))),
///     Manwon::new(dec!(100))
/// );
///
/// // 30 million KRW at 6% over one year.
/// let payment = monthly_payment(dec!(6), 12, Manwon::new(dec!(3000)));
/// assert_eq!(payment.value().round_dp(4), dec!(258.1993));
/// ```
pub fn monthly_payment(
    annual_rate_pct: Decimal,
    periods: u32,
    principal: Manwon,
) -> Manwon {
    if periods == 0 {
        return principal;
    }
    if annual_rate_pct.is_zero() {
        return principal / Decimal::from(periods);
    }

    let r = monthly_rate(annual_rate_pct);
    let Some(factor) = compound_factor(r, periods) else {
        // The annuity approaches an interest-only payment as (1+r)^n grows without bound.
        return principal * r;
    };
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return principal / Decimal::from(periods);
    }
    principal * (r * factor / denominator)
}

/// Largest principal whose level monthly payment equals `payment`.
///
/// The algebraic inverse of [`monthly_payment`].
///
/// # Examples
///
/// ```
/// use bridge_core::calculations::amortization::{max_principal, monthly_payment};
/// use bridge_core::Manwon;
/// use rust_decimal_macros::dec;
///
/// let principal = Manwon::new(dec!(48680));
/// let payment = monthly_payment(dec!(4.5), 480, principal);
/// let recovered = max_principal(dec!(4.5), 480, payment);
///
/// assert!((recovered - principal).value().abs() < dec!(0.000001));
/// ```
pub fn max_principal(
    annual_rate_pct: Decimal,
    periods: u32,
    payment: Manwon,
) -> Manwon {
    if periods == 0 {
        return Manwon::ZERO;
    }
    if annual_rate_pct.is_zero() {
        return payment * Decimal::from(periods);
    }

    let r = monthly_rate(annual_rate_pct);
    let Some(factor) = compound_factor(r, periods) else {
        return payment / r;
    };
    let growth = factor - Decimal::ONE;
    let denominator = r * factor;
    if growth.is_zero() || denominator.is_zero() {
        // The rate vanished at this precision: straight-line, as in the forward direction.
        return payment * Decimal::from(periods);
    }
    payment * (growth / denominator)
}

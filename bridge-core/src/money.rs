//! The base monetary unit used throughout the engine.
//!
//! Korean housing figures are quoted in *man-won* (10,000 KRW). Keeping every
//! amount in that unit keeps magnitudes small (a 900 million KRW apartment is
//! `90000`) and makes the unit visible in every signature, so a raw KRW value
//! cannot silently be mixed with a man-won one.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Number of man-won in one *eok* (100,000,000 KRW).
pub const MANWON_PER_EOK: Decimal = dec!(10000);

/// An amount of money expressed in man-won (10,000 KRW).
///
/// # Examples
///
/// ```
/// use bridge_core::Manwon;
/// use rust_decimal_macros::dec;
///
/// let price = Manwon::from_eok(dec!(9));
///
/// assert_eq!(price, Manwon::new(dec!(90000)));
/// assert_eq!(price.as_eok(), dec!(9));
/// assert_eq!(price * dec!(0.004), Manwon::new(dec!(360)));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Manwon(Decimal);

impl Manwon {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Converts an amount quoted in eok into man-won.
    pub fn from_eok(eok: Decimal) -> Self {
        Self(eok * MANWON_PER_EOK)
    }

    /// The raw decimal value in man-won.
    pub const fn value(self) -> Decimal {
        self.0
    }

    pub fn as_eok(self) -> Decimal {
        self.0 / MANWON_PER_EOK
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Clamps negative amounts to zero.
    pub fn floor_zero(self) -> Self {
        self.max(Self::ZERO)
    }

    /// Ratio of two amounts, or `None` when the denominator is zero.
    pub fn ratio_to(
        self,
        denominator: Manwon,
    ) -> Option<Decimal> {
        if denominator.is_zero() {
            None
        } else {
            Some(self.0 / denominator.0)
        }
    }
}

impl From<Decimal> for Manwon {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Manwon {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Manwon> for Decimal {
    fn from(value: Manwon) -> Self {
        value.0
    }
}

impl fmt::Display for Manwon {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0.round_dp(2).normalize())
    }
}

impl Add for Manwon {
    type Output = Manwon;

    fn add(
        self,
        rhs: Manwon,
    ) -> Manwon {
        Manwon(self.0 + rhs.0)
    }
}

impl AddAssign for Manwon {
    fn add_assign(
        &mut self,
        rhs: Manwon,
    ) {
        self.0 += rhs.0;
    }
}

impl Sub for Manwon {
    type Output = Manwon;

    fn sub(
        self,
        rhs: Manwon,
    ) -> Manwon {
        Manwon(self.0 - rhs.0)
    }
}

impl SubAssign for Manwon {
    fn sub_assign(
        &mut self,
        rhs: Manwon,
    ) {
        self.0 -= rhs.0;
    }
}

impl Neg for Manwon {
    type Output = Manwon;

    fn neg(self) -> Manwon {
        Manwon(-self.0)
    }
}

impl Mul<Decimal> for Manwon {
    type Output = Manwon;

    fn mul(
        self,
        rhs: Decimal,
    ) -> Manwon {
        Manwon(self.0 * rhs)
    }
}

/// Divides by a plain factor. The divisor must be non-zero.
impl Div<Decimal> for Manwon {
    type Output = Manwon;

    fn div(
        self,
        rhs: Decimal,
    ) -> Manwon {
        Manwon(self.0 / rhs)
    }
}

impl Sum for Manwon {
    fn sum<I: Iterator<Item = Manwon>>(iter: I) -> Self {
        iter.fold(Manwon::ZERO, Add::add)
    }
}

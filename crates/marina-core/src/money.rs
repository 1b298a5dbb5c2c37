//! # Money Module
//!
//! Provides the `Money` type for fares, fees and discounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Student fare on ₺200 at 15% off, in floating point:                   │
//! │    200 * (1 - 0.15) = 169.99999999999997  ❌                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (kuruş)                              │
//! │    20000 kuruş - 15% = 17000 kuruş                                     │
//! │    Every leg total is reproducible to the last kuruş                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Money` carries no currency. Base-currency figures flow through the fare
//! calculator; converted figures are wrapped in
//! [`DisplayAmount`](crate::currency::DisplayAmount) for presentation only.
//!
//! ## Usage
//! ```rust
//! use marina_core::money::Money;
//!
//! let fare = Money::from_major_minor(200, 0); // ₺200.00
//! let three = fare.multiply_quantity(3);
//! assert_eq!(three.minor(), 60000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (kuruş for TRY, cents for USD).
///
/// ## Where Money Flows
/// ```text
/// ClassPricing.base_price ──► FareLine.unit_price ──► FareLine.discounted_unit_price
///                                                          │
///                                                          ▼
///            LegFare.passenger_subtotal ──► early booking ──► + service fee
///                                                          │
///                                                          ▼
///                     FareBreakdown.grand_total ──► TicketRequest.total_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use marina_core::money::Money;
    ///
    /// let fee = Money::from_minor(1000); // ₺10.00
    /// assert_eq!(fee.minor(), 1000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    ///
    /// ```rust
    /// use marina_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(200, 0).minor(), 20000);
    /// assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (lira, dollars).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a head count or quantity.
    ///
    /// ```rust
    /// use marina_core::money::Money;
    ///
    /// let fee = Money::from_minor(1000);
    /// assert_eq!(fee.multiply_quantity(3).minor(), 3000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` of this amount, rounded half up to the nearest minor unit.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, in i128 so large
    /// totals cannot overflow.
    ///
    /// ```rust
    /// use marina_core::money::Money;
    /// use marina_core::types::Percentage;
    ///
    /// let subtotal = Money::from_minor(37000);
    /// assert_eq!(subtotal.percentage_of(Percentage::from_bps(1000)).minor(), 3700);
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> Money {
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(part as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Fare Workflow
    /// ```text
    /// Base price ₺200.00 (student, 15%)
    ///      │
    ///      ▼
    /// apply_percentage_discount(15%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Student unit price ₺170.00
    /// ```
    ///
    /// ```rust
    /// use marina_core::money::Money;
    /// use marina_core::types::Percentage;
    ///
    /// let base = Money::from_minor(20000);
    /// let student = base.apply_percentage_discount(Percentage::from_bps(1500));
    /// assert_eq!(student.minor(), 17000);
    /// ```
    pub fn apply_percentage_discount(&self, discount: Percentage) -> Money {
        *self - self.percentage_of(discount)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering without a symbol, e.g. `400.00`.
///
/// Use [`DisplayAmount`](crate::currency::DisplayAmount) when the currency
/// must be shown.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a passenger count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(17050);
        assert_eq!(money.minor(), 17050);
        assert_eq!(money.major(), 170);
        assert_eq!(money.minor_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(40000).to_string(), "400.00");
        assert_eq!(Money::from_minor(505).to_string(), "5.05");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3u32).minor(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_percentage_discount() {
        let base = Money::from_minor(20000);
        assert_eq!(base.apply_percentage_discount(Percentage::from_bps(1500)).minor(), 17000);
        assert_eq!(base.apply_percentage_discount(Percentage::from_bps(2000)).minor(), 16000);
        assert_eq!(base.apply_percentage_discount(Percentage::FULL).minor(), 0);
        assert_eq!(base.apply_percentage_discount(Percentage::zero()).minor(), 20000);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 10% of 0.05 = 0.005 → 0.01
        assert_eq!(Money::from_minor(5).percentage_of(Percentage::from_bps(1000)).minor(), 1);
        // 10% of 0.04 = 0.004 → 0.00
        assert_eq!(Money::from_minor(4).percentage_of(Percentage::from_bps(1000)).minor(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(100).is_positive());
        assert!(Money::from_minor(-100).is_negative());
    }
}

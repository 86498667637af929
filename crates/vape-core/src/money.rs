//! # Money
//!
//! Hryvnia amounts stored as whole kopecks in an `i64`.
//!
//! ```text
//!   form input "150.50"  ──►  Money(15050)  ──►  JSON 15050
//!   ledger cash += sale  ──►  exact integer add, never drifts
//!   chat report          ──►  "150.50"
//! ```
//!
//! ## Usage
//! ```rust
//! use vape_core::money::Money;
//!
//! let price = Money::from_hryvnias(150);
//! let total = price * 2 + Money::from_kopecks(50);
//! assert_eq!(total.to_string(), "300.50");
//! ```
//!
//! The operators saturate instead of wrapping or panicking. Sums that feed
//! the ledger use [`Money::checked_add`] / [`Money::checked_mul`] so an
//! impossible amount surfaces as an error rather than a clamped number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in kopecks (1/100 of a hryvnia).
///
/// ## Design Decisions
/// - **i64 (signed)**: the owner may correct the ledger downwards
/// - **Newtype serde**: travels over JSON as a plain integer of kopecks
///
/// ## Where Money is Used
/// ```text
/// Product.sale_price ──► CartLine.unit_price ──► Cart.total ──► PaymentSplit
///                                   │
///                                   └──► Ledger.cash / card / salary / mine
///
/// Product.sale_price × stock ──► Ledger.total (remaining inventory value)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kopecks (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vape_core::money::Money;
    ///
    /// let price = Money::from_kopecks(15050); // 150.50 грн
    /// assert_eq!(price.kopecks(), 15050);
    /// ```
    #[inline]
    pub const fn from_kopecks(kopecks: i64) -> Self {
        Money(kopecks)
    }

    /// Creates a Money value from whole hryvnias.
    #[inline]
    pub const fn from_hryvnias(hryvnias: i64) -> Self {
        Money(hryvnias.saturating_mul(100))
    }

    /// Returns the value in kopecks.
    #[inline]
    pub const fn kopecks(&self) -> i64 {
        self.0
    }

    /// Returns the whole-hryvnia portion (truncated toward zero).
    #[inline]
    pub const fn hryvnias(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the kopeck portion (always 0-99).
    #[inline]
    pub const fn kopecks_part(&self) -> i64 {
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vape_core::money::Money;
    ///
    /// let bottle = Money::from_hryvnias(100);
    /// assert_eq!(bottle.multiply_quantity(5).hryvnias(), 500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the sum does not fit in `i64` kopecks.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// `None` when the product does not fit in `i64` kopecks.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders whole hryvnias without decimals, otherwise two decimals.
///
/// Chat reports append the currency themselves (`"150 грн"`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = self.hryvnias().abs();
        match self.kopecks_part() {
            0 => write!(f, "{}{}", sign, whole),
            part => write!(f, "{}{}.{:02}", sign, whole, part),
        }
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A household ledger summed over years of entries accumulates exactly   │
//! │  this kind of drift.                                                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    8500.00 yuan = 850000 cents, summed exactly, forever.               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! // Create from cents (preferred)
//! let salary = Money::from_cents(850_000); // ¥8500.00
//!
//! // Or parse what the UI collects from an input field
//! let parsed: Money = "8500.00".parse().unwrap();
//! assert_eq!(parsed, salary);
//!
//! // Arithmetic operations
//! let total = salary + Money::from_cents(50_000); // ¥9000.00
//! assert_eq!(total.to_string(), "9000.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (分 / cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Expense totals can be subtracted from income totals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support; serializes as a plain integer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and store API all use cents.
    /// Only the UI converts to major units for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (yuan and fen).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99); // ¥10.99
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let refund = Money::from_major_minor(-5, 50); // -¥5.50
    /// assert_eq!(refund.cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major.saturating_mul(100).saturating_sub(minor))
        } else {
            Money(major.saturating_mul(100).saturating_add(minor))
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is strictly positive.
    ///
    /// Ledger entries must satisfy this; the database enforces it again with
    /// a CHECK constraint.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Saturating addition (totals never wrap on pathological input).
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

// =============================================================================
// Arithmetic
// =============================================================================
// All operators saturate. A ledger total near i64::MAX cents is already
// garbage data; clamping beats wrapping into a negative fortune in a release
// build where the overflow check is off.

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc.saturating_add(m))
    }
}

// =============================================================================
// Display & Parsing
// =============================================================================

/// Formats as decimal major units without a currency symbol ("8500.00").
///
/// The UI owns the currency symbol (¥ for the default locale); keeping the
/// symbol out of `Display` keeps parsing round-trippable.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Parses decimal input like `"8500"`, `"8500.5"`, or `"8500.00"`.
///
/// At most two fractional digits are accepted; a third would silently drop
/// sub-cent precision, so it is rejected instead.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "must be a decimal number with at most two fractional digits".to_string(),
        };

        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((maj, min)) => (maj, min),
            None => (digits, ""),
        };

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(invalid());
        }
        if minor_str.len() > 2 {
            return Err(invalid());
        }
        if !major_str.chars().all(|c| c.is_ascii_digit())
            || !minor_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str.parse().map_err(|_| invalid())?
        };
        // "8500.5" means 50 fen, not 5
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => minor_str.parse().map_err(|_| invalid())?,
        };

        // An amount that doesn't fit in i64 cents is rejected, not wrapped.
        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .and_then(|c| c.checked_mul(sign))
            .ok_or_else(invalid)?;

        Ok(Money(cents))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

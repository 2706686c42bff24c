//! # Validation Module
//!
//! Input validation rules applied before SQL runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI collaborator                                              │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the store before executing SQL)       │
//! │  └── Domain rule validation                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  ├── CHECK (amount_cents > 0, kind IN (...))                           │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::{MAX_NAME_LEN, MAX_TEXT_LEN};
use chrono::NaiveDate;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a category or item name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_name;
///
/// assert!(validate_name("工资").is_ok());
/// assert!(validate_name("  ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field (description, movement reason).
pub fn validate_text(field: &str, text: &str) -> ValidationResult<()> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a `#rrggbb` category color.
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let ok = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !ok {
        return Err(ValidationError::InvalidFormat {
            field: "color".to_string(),
            reason: "must be a #rrggbb hex color".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a ledger amount.
///
/// ## Rules
/// - Must be strictly positive: the entry's kind carries the sign, the
///   amount never does. Mirrors the `amount_cents > 0` CHECK constraint.
pub fn validate_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a movement quantity.
///
/// ## Rules
/// - Must be finite and strictly positive (the direction carries the sign)
pub fn validate_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates an item's starting stock level. Zero is a normal starting
/// point; negative stock can only arise later through movements.
pub fn validate_initial_quantity(quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }

    Ok(())
}

/// Validates an item's reorder threshold. Zero is valid (flagging disabled),
/// negative is not.
pub fn validate_min_quantity(min_quantity: f64) -> ValidationResult<()> {
    if !min_quantity.is_finite() || min_quantity < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "min_quantity".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates an inclusive date range used by summaries and filters.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvertedDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("工资").is_ok());
        assert!(validate_name("Groceries").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"长".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#52c41a").is_ok());
        assert!(validate_color("#FF4D4F").is_ok());

        assert!(validate_color("52c41a").is_err());
        assert!(validate_color("#52c41").is_err());
        assert!(validate_color("#52c41g").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Money::from_cents(1)).is_ok());
        assert!(validate_amount(Money::zero()).is_err());
        assert!(validate_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.5).is_ok());
        assert!(validate_quantity(5.0).is_ok());

        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_initial_quantity_allows_zero() {
        assert!(validate_initial_quantity(0.0).is_ok());
        assert!(validate_initial_quantity(1.5).is_ok());
        assert!(validate_initial_quantity(-1.0).is_err());
        assert!(validate_initial_quantity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_min_quantity_allows_zero() {
        assert!(validate_min_quantity(0.0).is_ok());
        assert!(validate_min_quantity(10.0).is_ok());
        assert!(validate_min_quantity(-0.1).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert!(validate_date_range(jan1, jan31).is_ok());
        assert!(validate_date_range(jan1, jan1).is_ok());
        assert!(validate_date_range(jan31, jan1).is_err());
    }
}

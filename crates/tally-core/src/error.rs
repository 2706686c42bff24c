//! # Error Types
//!
//! Validation errors for the domain layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │      └── wraps ValidationError for pre-SQL checks                      │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → UI collaborator                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limits)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller-supplied input breaks a domain rule before any
/// SQL runs. The database constraints (CHECK, UNIQUE, FOREIGN KEY) remain
/// the backstop for anything that slips past.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    ///
    /// Used for ledger amounts and movement quantities: a zero-amount entry
    /// or a zero-quantity movement records nothing and is rejected.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (malformed amount, malformed color, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Inverted date range (start after end).
    #[error("date range is inverted: {start} is after {end}")]
    InvertedDateRange { start: String, end: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

//! # tally-core: Pure Domain Types for Tally
//!
//! Tally is a personal household finance and inventory tracker. This crate is
//! the pure domain layer: record types, money arithmetic, input validation,
//! and the default seed tables. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 GUI / reporting (external)                      │   │
//! │  │    ledger panel ──► inventory panel ──► statistics panel        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ store contract                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │   seed    │  │   │
//! │  │   │  Entry    │  │   Money   │  │   rules   │  │ defaults  │  │   │
//! │  │   │  Item     │  │  (cents)  │  │  checks   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tally-db (Ledger & Inventory Store)              │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Entry, Item, Movement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//! - [`seed`] - Default category seed tables
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod seed;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default color assigned to categories created without an explicit one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#1890ff";

/// Default measurement unit for inventory items ("个" = piece/unit).
///
/// The seed tables and the original data set are Chinese; callers can pass
/// any unit string they like ("kg", "盒", "L", ...).
pub const DEFAULT_ITEM_UNIT: &str = "个";

/// Maximum length accepted for names (categories, items).
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length accepted for free-text fields (descriptions, reasons).
pub const MAX_TEXT_LEN: usize = 500;

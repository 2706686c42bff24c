//! # tally-db: Storage Layer for Tally
//!
//! This crate is the Ledger & Inventory Store for the Tally household
//! tracker. It owns the embedded SQLite database and exposes typed
//! repositories over it with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Data Flow                                 │
//! │                                                                         │
//! │  UI collaborator (add_entry, list_items, monthly summary)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (entry.rs,   │    │  (embedded)  │  │   │
//! │  │   │               │    │   item.rs...) │    │              │  │   │
//! │  │   │ SqlitePool    │    │ EntryRepo     │    │ 001_initial  │  │   │
//! │  │   │ WAL, FK ON    │◄───│ ItemRepo      │    │ 002_indexes  │  │   │
//! │  │   │ Seeding       │    │ MovementRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.tally/tally.db  (single file, WAL sidecars alongside)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store handle, connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`seed`] - Idempotent default-category seeding
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (entry, item, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Store, StoreConfig};
//!
//! // Open (and create if absent), migrate, seed
//! let store = Store::open(StoreConfig::new("path/to/tally.db")).await?;
//!
//! // Use repositories
//! let recent = store.entries().list(EntryFilter::default().limit(10)).await?;
//! let low = store.items().list_low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::entry::EntryRepository;
pub use repository::item::{ItemCategoryRepository, ItemRepository};
pub use repository::movement::MovementRepository;
pub use repository::settings::SettingsRepository;

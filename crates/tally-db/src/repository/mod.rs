//! # Repository Module
//!
//! Database repository implementations for the store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  UI collaborator                                                       │
//! │       │                                                                 │
//! │       │  store.entries().list(filter)                                  │
//! │       ▼                                                                 │
//! │  EntryRepository                                                       │
//! │  ├── list(&self, filter)                                               │
//! │  ├── insert(&self, entry)                                              │
//! │  ├── update(&self, id, patch)                                          │
//! │  └── summarize(&self, start, end)                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • The UI never issues raw SQL                                         │
//! │  • SQL is isolated in one place per entity                             │
//! │  • Typed filters/patches - arbitrary column names can't reach a query  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Ledger categories
//! - [`entry::EntryRepository`] - Ledger entries and summaries
//! - [`item::ItemRepository`] / [`item::ItemCategoryRepository`] - Inventory
//! - [`movement::MovementRepository`] - Stock movements and reconciliation
//! - [`settings::SettingsRepository`] - Key/value preferences

pub mod category;
pub mod entry;
pub mod item;
pub mod movement;
pub mod settings;

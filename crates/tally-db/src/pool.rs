//! # Store & Connection Pool Management
//!
//! Connection pool creation and configuration for SQLite, plus the `Store`
//! handle that owns it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Store Lifecycle                                 │
//! │                                                                         │
//! │  App startup (external)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(path) ← path supplied by the configuration           │
//! │       │                   collaborator (per-user data directory)       │
//! │       ▼                                                                 │
//! │  Store::open(config).await                                             │
//! │       ├── build pool (WAL, foreign keys ON, busy timeout)              │
//! │       ├── run embedded migrations                                      │
//! │       └── seed default categories (INSERT OR IGNORE by name)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.entries().list(...) / store.items().insert(...) / ...           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.close().await  (shutdown)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Readers don't block writers, writers don't block readers
//! - Better crash recovery
//!
//! A connection failure aborts `open` with a typed error; the store never
//! continues with a dead handle.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::item::{ItemCategoryRepository, ItemRepository};
use crate::repository::movement::MovementRepository;
use crate::repository::settings::SettingsRepository;
use crate::seed;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// Constructed once at process start by the configuration collaborator and
/// handed to [`Store::open`] - never ambient global state.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/home/user/.tally/tally.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file. Created if absent.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (plenty for a single-user desktop app)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Bound on waiting for a pool connection. Exceeding it surfaces as
    /// `DbError::PoolExhausted` rather than hanging an operation forever.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// How long SQLite retries on a locked database before failing the
    /// statement. Contention past this bound is a typed error; callers
    /// decide whether to retry.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on open.
    /// Default: true
    pub run_migrations: bool,

    /// Whether to insert the default category seed rows on open
    /// (idempotent, insert-if-absent by unique name).
    /// Default: true
    pub seed_defaults: bool,
}

impl StoreConfig {
    /// Creates a store configuration with the given database path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            seed_defaults: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the pool acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets whether to seed default categories on open.
    pub fn seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let store = Store::open(StoreConfig::in_memory()).await?;
    /// // Fully isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires a single connection
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            seed_defaults: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// The Ledger & Inventory Store: sole owner of the database handle.
///
/// Cloning is cheap (the pool is internally reference-counted); every
/// repository accessor hands out a lightweight view over the same pool.
/// All records returned by repositories are detached value copies with no
/// live binding back to storage.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if absent) the database and prepares it for use.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys ENFORCED (declared-but-off is how the data rots)
    ///    - Busy timeout as the lock-contention bound
    /// 3. Creates the connection pool
    /// 4. Runs migrations and seeds default categories (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Store)` - Ready-to-use store
    /// * `Err(DbError::ConnectionFailed)` - file inaccessible, permissions,
    ///   corruption; initialization aborts, never a half-open store
    pub async fn open(config: StoreConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening ledger & inventory store"
        );

        // sqlite://path with mode=rwc creates the file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let store = Store { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        if config.seed_defaults {
            store.seed_defaults().await?;
        }

        Ok(store)
    }

    /// Runs database migrations.
    ///
    /// Called automatically by `open` unless disabled in the config.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Inserts the default ledger and item categories, skipping any name
    /// that already exists. Safe to call on every startup.
    pub async fn seed_defaults(&self) -> DbResult<()> {
        seed::seed_defaults(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories.
    /// Prefer using repository methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the ledger category repository.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Returns the ledger entry repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let recent = store.entries().list(EntryFilter::default().limit(10)).await?;
    /// ```
    pub fn entries(&self) -> EntryRepository {
        EntryRepository::new(self.pool.clone())
    }

    /// Returns the item category repository.
    pub fn item_categories(&self) -> ItemCategoryRepository {
        ItemCategoryRepository::new(self.pool.clone())
    }

    /// Returns the inventory item repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.pool.clone())
    }

    /// Returns the stock movement repository.
    pub fn movements(&self) -> MovementRepository {
        MovementRepository::new(self.pool.clone())
    }

    /// Returns the settings repository.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing store connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        assert!(store.health_check().await);

        let (total, applied) = migrations::migration_status(store.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_migration_status_errors_on_unmigrated_database() {
        let store = Store::open(
            StoreConfig::in_memory()
                .run_migrations(false)
                .seed_defaults(false),
        )
        .await
        .unwrap();

        // No migration ledger table yet: that's an error, not "0 applied".
        assert!(migrations::migration_status(store.pool()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = StoreConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_secs(2));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_reopen_preserves_data_and_reseeds_nothing() {
        use tally_core::seed::DEFAULT_CATEGORIES;
        use tally_core::{EntryKind, Money, NewEntry};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");

        let entry_id = {
            let store = Store::open(StoreConfig::new(&path)).await.unwrap();
            let salary = store
                .categories()
                .find_by_name("工资")
                .await
                .unwrap()
                .expect("seeded");
            let id = store
                .entries()
                .insert(&NewEntry {
                    kind: EntryKind::Income,
                    amount: Money::from_cents(850_000),
                    category_id: salary.id,
                    description: None,
                    date: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                })
                .await
                .unwrap();
            store.close().await;
            id
        };

        // Second open runs migrations + seeding again against the same file.
        let store = Store::open(StoreConfig::new(&path)).await.unwrap();
        let entry = store.entries().get(entry_id).await.unwrap().expect("persisted");
        assert_eq!(entry.amount_cents, 850_000);

        let categories = store.categories().list(None).await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
    }

    #[tokio::test]
    async fn test_open_without_seeding() {
        let store = Store::open(StoreConfig::in_memory().seed_defaults(false))
            .await
            .unwrap();

        let categories = store.categories().list(None).await.unwrap();
        assert!(categories.is_empty());
    }
}

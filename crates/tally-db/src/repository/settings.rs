//! # Settings Repository
//!
//! A small key/value table for user preferences (theme, currency symbol,
//! backup path). Values are opaque strings; callers own the encoding.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tally_core::validation::validate_name;
use tally_core::Setting;

/// Repository for settings operations.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting's value. Absent keys and NULL values both read as
    /// `None`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<Option<String>> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.flatten())
    }

    /// Creates or replaces a setting, bumping `updated_at`.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        validate_name(key)?;

        debug!(key = %key, "Setting value");

        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a setting. Returns affected rows (0 if the key was absent).
    pub async fn remove(&self, key: &str) -> DbResult<u64> {
        debug!(key = %key, "Removing setting");

        let result = sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists all settings, ordered by key.
    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Store, StoreConfig};

    async fn open_store() -> Store {
        Store::open(StoreConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let store = open_store().await;
        assert_eq!(store.settings().get("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let store = open_store().await;
        let settings = store.settings();

        settings.set("theme", "dark").await.unwrap();
        assert_eq!(settings.get("theme").await.unwrap().as_deref(), Some("dark"));

        settings.set("theme", "light").await.unwrap();
        assert_eq!(settings.get("theme").await.unwrap().as_deref(), Some("light"));

        // Upsert, not insert-twice: still one row.
        assert_eq!(settings.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_rejects_empty_key() {
        let store = open_store().await;

        let err = store.settings().set("  ", "x").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = open_store().await;
        let settings = store.settings();

        settings.set("currency_symbol", "¥").await.unwrap();
        assert_eq!(settings.remove("currency_symbol").await.unwrap(), 1);
        assert_eq!(settings.get("currency_symbol").await.unwrap(), None);
        assert_eq!(settings.remove("currency_symbol").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_ordered_by_key() {
        let store = open_store().await;
        let settings = store.settings();

        settings.set("theme", "dark").await.unwrap();
        settings.set("currency_symbol", "¥").await.unwrap();

        let all = settings.list().await.unwrap();
        let keys: Vec<_> = all.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["currency_symbol", "theme"]);
    }
}

//! # Default Category Seeding
//!
//! Inserts the fixed default category tables on startup, idempotently:
//! `INSERT OR IGNORE` keyed on the unique name, so a name the user has
//! renamed, recolored, or created themselves is never touched, and
//! re-running initialization never duplicates a row.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use tally_core::seed::{SeedCategory, SeedItemCategory, DEFAULT_CATEGORIES, DEFAULT_ITEM_CATEGORIES};

/// Seeds both default tables. Called by `Store::open` unless disabled.
pub async fn seed_defaults(pool: &SqlitePool) -> DbResult<()> {
    let inserted = seed_categories(pool, DEFAULT_CATEGORIES).await?
        + seed_item_categories(pool, DEFAULT_ITEM_CATEGORIES).await?;

    if inserted > 0 {
        info!(inserted, "Seeded default categories");
    } else {
        debug!("Default categories already present");
    }

    Ok(())
}

/// Inserts ledger categories that don't already exist by name.
/// Returns how many rows were actually inserted.
pub async fn seed_categories(pool: &SqlitePool, seeds: &[SeedCategory<'_>]) -> DbResult<u64> {
    let now = Utc::now();
    let mut inserted = 0;

    for seed in seeds {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO categories (name, kind, color, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(seed.name)
        .bind(seed.kind)
        .bind(seed.color)
        .bind(now)
        .execute(pool)
        .await?;

        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Inserts item categories that don't already exist by name.
/// Returns how many rows were actually inserted.
pub async fn seed_item_categories(
    pool: &SqlitePool,
    seeds: &[SeedItemCategory<'_>],
) -> DbResult<u64> {
    let now = Utc::now();
    let mut inserted = 0;

    for seed in seeds {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO item_categories (name, description, created_at) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(seed.name)
        .bind(seed.description)
        .bind(now)
        .execute(pool)
        .await?;

        inserted += result.rows_affected();
    }

    Ok(inserted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        let before = store.categories().list(None).await.unwrap();
        assert_eq!(before.len(), DEFAULT_CATEGORIES.len());

        // Re-running inserts nothing new.
        let inserted = seed_categories(store.pool(), DEFAULT_CATEGORIES)
            .await
            .unwrap();
        assert_eq!(inserted, 0);

        let after = store.categories().list(None).await.unwrap();
        assert_eq!(after.len(), before.len());
    }

    #[tokio::test]
    async fn test_seeding_never_overwrites_user_edits() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        // User recolors 工资.
        let salary = store
            .categories()
            .find_by_name("工资")
            .await
            .unwrap()
            .expect("seeded");
        store
            .categories()
            .update(
                salary.id,
                tally_core::CategoryPatch::default().color("#000000"),
            )
            .await
            .unwrap();

        store.seed_defaults().await.unwrap();

        let salary = store
            .categories()
            .find_by_name("工资")
            .await
            .unwrap()
            .expect("still there");
        assert_eq!(salary.color, "#000000");
    }
}

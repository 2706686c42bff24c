//! # Category Repository
//!
//! Database operations for ledger categories.
//!
//! Categories are the referential backbone of the ledger: every entry points
//! at one. Deleting a category that still has entries is rejected by the
//! engine (`ON DELETE RESTRICT`) and surfaces as `DbError::ForeignKey` - the
//! caller decides whether to reassign the entries first.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::validation::{validate_color, validate_name};
use tally_core::{Category, CategoryPatch, EntryKind, NewCategory};

/// Repository for ledger category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories, optionally restricted to one kind, ordered by name.
    pub async fn list(&self, kind: Option<EntryKind>) -> DbResult<Vec<Category>> {
        let mut sql = String::from(
            "SELECT id, name, kind, color, created_at FROM categories WHERE 1=1",
        );
        if kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        sql.push_str(" ORDER BY name");

        let mut query = sqlx::query_as::<_, Category>(&sql);
        if let Some(kind) = kind {
            query = query.bind(kind);
        }

        let categories = query.fetch_all(&self.pool).await?;
        Ok(categories)
    }

    /// Gets a category by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, color, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by its unique name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, kind, color, created_at FROM categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category and returns its id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - empty name, malformed color
    /// * `DbError::Conflict` - a category with the same name exists
    pub async fn insert(&self, category: &NewCategory) -> DbResult<i64> {
        validate_name(&category.name)?;
        validate_color(&category.color)?;

        debug!(name = %category.name, kind = category.kind.as_str(), "Inserting category");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (name, kind, color, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(category.name.trim())
        .bind(category.kind)
        .bind(&category.color)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Conflict { .. } => DbError::conflict("category name", &category.name),
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Applies a sparse patch (name and/or color). Returns affected rows:
    /// 0 for an unknown id or an empty patch.
    pub async fn update(&self, id: i64, patch: CategoryPatch) -> DbResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(color) = &patch.color {
            validate_color(color)?;
        }

        debug!(id, "Updating category");

        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push("name = ?");
        }
        if patch.color.is_some() {
            sets.push("color = ?");
        }
        let sql = format!("UPDATE categories SET {} WHERE id = ?", sets.join(", "));

        let mut query = sqlx::query(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name.trim().to_string());
        }
        if let Some(color) = &patch.color {
            query = query.bind(color);
        }
        query = query.bind(id);

        let result = query.execute(&self.pool).await.map_err(|e| {
            match DbError::from(e) {
                DbError::Conflict { .. } => {
                    DbError::conflict("category name", patch.name.as_deref().unwrap_or(""))
                }
                other => other,
            }
        })?;

        Ok(result.rows_affected())
    }

    /// Hard-deletes a category. Returns affected rows (0 if absent).
    ///
    /// Fails with `DbError::ForeignKey` while ledger entries still reference
    /// it; the entries are left intact.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts categories (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn empty_store() -> Store {
        Store::open(StoreConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = empty_store().await;
        let repo = store.categories();

        let id = repo
            .insert(&NewCategory::new("工资", EntryKind::Income).with_color("#52c41a"))
            .await
            .unwrap();

        let category = repo.get(id).await.unwrap().expect("inserted");
        assert_eq!(category.name, "工资");
        assert_eq!(category.kind, EntryKind::Income);
        assert_eq!(category.color, "#52c41a");
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = empty_store().await;
        let repo = store.categories();

        repo.insert(&NewCategory::new("餐饮", EntryKind::Expense))
            .await
            .unwrap();
        let err = repo
            .insert(&NewCategory::new("餐饮", EntryKind::Expense))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_kind_and_orders_by_name() {
        let store = empty_store().await;
        let repo = store.categories();

        repo.insert(&NewCategory::new("工资", EntryKind::Income))
            .await
            .unwrap();
        repo.insert(&NewCategory::new("购物", EntryKind::Expense))
            .await
            .unwrap();
        repo.insert(&NewCategory::new("交通", EntryKind::Expense))
            .await
            .unwrap();

        let expenses = repo.list(Some(EntryKind::Expense)).await.unwrap();
        assert_eq!(expenses.len(), 2);
        let names: Vec<_> = expenses.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        assert_eq!(repo.list(None).await.unwrap().len(), 3);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_patch_update() {
        let store = empty_store().await;
        let repo = store.categories();

        let id = repo
            .insert(&NewCategory::new("娱乐", EntryKind::Expense))
            .await
            .unwrap();

        let affected = repo
            .update(id, CategoryPatch::default().color("#faad14"))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let category = repo.get(id).await.unwrap().unwrap();
        assert_eq!(category.color, "#faad14");
        assert_eq!(category.name, "娱乐");

        // Empty patch is a no-op, unknown id affects nothing.
        assert_eq!(repo.update(id, CategoryPatch::default()).await.unwrap(), 0);
        assert_eq!(
            repo.update(9999, CategoryPatch::default().name("x"))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_rejected_while_referenced() {
        use chrono::NaiveDate;
        use tally_core::{Money, NewEntry};

        let store = empty_store().await;
        let repo = store.categories();

        let id = repo
            .insert(&NewCategory::new("工资", EntryKind::Income))
            .await
            .unwrap();
        let entry_id = store
            .entries()
            .insert(&NewEntry {
                kind: EntryKind::Income,
                amount: Money::from_cents(850_000),
                category_id: id,
                description: None,
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            })
            .await
            .unwrap();

        let err = repo.delete(id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));

        // The entry is untouched; removing it unblocks the delete.
        assert!(store.entries().get(entry_id).await.unwrap().is_some());
        store.entries().delete(entry_id).await.unwrap();
        assert_eq!(repo.delete(id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input() {
        let store = empty_store().await;
        let repo = store.categories();

        let err = repo
            .insert(&NewCategory::new("  ", EntryKind::Income))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .insert(&NewCategory::new("工资", EntryKind::Income).with_color("green"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}

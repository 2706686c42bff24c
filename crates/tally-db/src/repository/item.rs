//! # Inventory Item Repositories
//!
//! Database operations for item categories and the items themselves.
//!
//! ## Referential Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   item_categories ──┐                                                   │
//! │                     │ deleting a category does NOT delete its items:    │
//! │                     │ items.category_id is nulled (ON DELETE SET NULL)  │
//! │                     ▼                                                   │
//! │   items ── quantity is OWNED by the movement log. Inserts set the       │
//! │            starting level; afterwards only movements (and reconcile)    │
//! │            change it, so ItemPatch carries no quantity field.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::validation::{
    validate_initial_quantity, validate_min_quantity, validate_name, validate_text,
};
use tally_core::{Item, ItemCategory, ItemFilter, ItemPatch, NewItem};

/// Columns selected for every item read, including the joined category name.
const ITEM_SELECT: &str = "SELECT i.id, i.name, i.category_id, ic.name AS category_name, \
     i.quantity, i.unit, i.unit_price_cents, i.min_quantity, i.description, \
     i.created_at, i.updated_at \
     FROM items i LEFT JOIN item_categories ic ON i.category_id = ic.id";

// =============================================================================
// Item Categories
// =============================================================================

/// Repository for inventory item categories.
#[derive(Debug, Clone)]
pub struct ItemCategoryRepository {
    pool: SqlitePool,
}

impl ItemCategoryRepository {
    /// Creates a new ItemCategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemCategoryRepository { pool }
    }

    /// Lists all item categories, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<ItemCategory>> {
        let categories = sqlx::query_as::<_, ItemCategory>(
            "SELECT id, name, description, created_at FROM item_categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets an item category by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<ItemCategory>> {
        let category = sqlx::query_as::<_, ItemCategory>(
            "SELECT id, name, description, created_at FROM item_categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts an item category and returns its id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - empty name, oversized description
    /// * `DbError::Conflict` - a category with the same name exists
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<i64> {
        validate_name(name)?;
        if let Some(description) = description {
            validate_text("description", description)?;
        }

        debug!(name = %name, "Inserting item category");

        let result = sqlx::query(
            "INSERT INTO item_categories (name, description, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(name.trim())
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Conflict { .. } => DbError::conflict("item category name", name),
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Renames a category and/or replaces its description. Returns affected
    /// rows (0 if absent).
    pub async fn update(&self, id: i64, name: &str, description: Option<&str>) -> DbResult<u64> {
        validate_name(name)?;
        if let Some(description) = description {
            validate_text("description", description)?;
        }

        debug!(id, "Updating item category");

        let result = sqlx::query("UPDATE item_categories SET name = ?1, description = ?2 WHERE id = ?3")
            .bind(name.trim())
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict { .. } => DbError::conflict("item category name", name),
                other => other,
            })?;

        Ok(result.rows_affected())
    }

    /// Deletes an item category. Items that referenced it survive with their
    /// `category_id` nulled by the engine. Returns affected rows.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting item category");

        let result = sqlx::query("DELETE FROM item_categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Items
// =============================================================================

/// Repository for inventory items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists items matching the filter, ordered by name.
    ///
    /// The keyword is a substring match on the item name OR description.
    /// `low_stock_only` keeps items at or below a non-zero reorder threshold.
    pub async fn list(&self, filter: ItemFilter) -> DbResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT} WHERE 1=1");

        if filter.category_id.is_some() {
            sql.push_str(" AND i.category_id = ?");
        }
        if filter.keyword.is_some() {
            sql.push_str(" AND (i.name LIKE ? OR i.description LIKE ?)");
        }
        if filter.low_stock_only {
            sql.push_str(" AND i.min_quantity > 0 AND i.quantity <= i.min_quantity");
        }
        sql.push_str(" ORDER BY i.name");

        let mut query = sqlx::query_as::<_, Item>(&sql);
        if let Some(category_id) = filter.category_id {
            query = query.bind(category_id);
        }
        if let Some(keyword) = &filter.keyword {
            let pattern = format!("%{}%", keyword.trim());
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let items = query.fetch_all(&self.pool).await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Lists items at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Item>> {
        self.list(ItemFilter::default().low_stock_only()).await
    }

    /// Gets an item by id (enriched with its category name).
    pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
        let sql = format!("{ITEM_SELECT} WHERE i.id = ?1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Inserts an item with its starting stock level and returns its id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - empty name, negative starting quantity or
    ///   threshold, oversized description
    /// * `DbError::ForeignKey` - the item category does not exist
    pub async fn insert(&self, item: &NewItem) -> DbResult<i64> {
        validate_name(&item.name)?;
        validate_initial_quantity(item.quantity)?;
        validate_min_quantity(item.min_quantity)?;
        if let Some(description) = &item.description {
            validate_text("description", description)?;
        }

        debug!(name = %item.name, quantity = item.quantity, "Inserting item");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO items (name, category_id, quantity, unit, unit_price_cents, \
             min_quantity, description, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(item.name.trim())
        .bind(item.category_id)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.unit_price.cents())
        .bind(item.min_quantity)
        .bind(&item.description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Applies a sparse patch and bumps `updated_at`. Returns affected rows:
    /// 0 for an unknown id or an empty patch.
    ///
    /// Stock levels are not patchable here; record a movement or run
    /// `reconcile` instead.
    pub async fn update(&self, id: i64, patch: ItemPatch) -> DbResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(min) = patch.min_quantity {
            validate_min_quantity(min)?;
        }
        if let Some(Some(description)) = &patch.description {
            validate_text("description", description)?;
        }

        debug!(id, "Updating item");

        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push("name = ?");
        }
        if patch.category_id.is_some() {
            sets.push("category_id = ?");
        }
        if patch.unit.is_some() {
            sets.push("unit = ?");
        }
        if patch.unit_price.is_some() {
            sets.push("unit_price_cents = ?");
        }
        if patch.min_quantity.is_some() {
            sets.push("min_quantity = ?");
        }
        if patch.description.is_some() {
            sets.push("description = ?");
        }
        sets.push("updated_at = ?");
        let sql = format!("UPDATE items SET {} WHERE id = ?", sets.join(", "));

        let mut query = sqlx::query(&sql);
        if let Some(name) = &patch.name {
            query = query.bind(name.trim().to_string());
        }
        if let Some(category_id) = patch.category_id {
            // Some(None) detaches the item from its category
            query = query.bind(category_id);
        }
        if let Some(unit) = patch.unit {
            query = query.bind(unit);
        }
        if let Some(price) = patch.unit_price {
            query = query.bind(price.cents());
        }
        if let Some(min) = patch.min_quantity {
            query = query.bind(min);
        }
        if let Some(description) = patch.description {
            query = query.bind(description);
        }
        query = query.bind(Utc::now()).bind(id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Hard-deletes an item and, via cascade, its movement history. Returns
    /// affected rows.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Counts items (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
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
    use tally_core::Money;

    async fn open_store() -> Store {
        Store::open(StoreConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_item_category_crud() {
        let store = open_store().await;
        let repo = store.item_categories();

        let id = repo.insert("食品饮料", Some("食品、饮料、零食等")).await.unwrap();
        let read = repo.get(id).await.unwrap().expect("inserted");
        assert_eq!(read.name, "食品饮料");
        assert_eq!(read.description.as_deref(), Some("食品、饮料、零食等"));

        // Duplicate name
        let err = repo.insert("食品饮料", None).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        assert_eq!(repo.update(id, "饮料", None).await.unwrap(), 1);
        let renamed = repo.get(id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "饮料");
        assert_eq!(renamed.description, None);

        assert_eq!(repo.delete(id).await.unwrap(), 1);
        assert!(repo.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_item_round_trip_with_category() {
        let store = open_store().await;
        let cat = store.item_categories().insert("食品饮料", None).await.unwrap();

        let id = store
            .items()
            .insert(
                &NewItem::new("牛奶")
                    .category_id(cat)
                    .quantity(8.0)
                    .unit("瓶")
                    .unit_price(Money::from_cents(350))
                    .min_quantity(10.0),
            )
            .await
            .unwrap();

        let milk = store.items().get(id).await.unwrap().expect("inserted");
        assert_eq!(milk.name, "牛奶");
        assert_eq!(milk.category_name.as_deref(), Some("食品饮料"));
        assert_eq!(milk.quantity, 8.0);
        assert_eq!(milk.unit, "瓶");
        assert_eq!(milk.unit_price_cents, 350);
        assert!(milk.is_low_stock());
    }

    #[tokio::test]
    async fn test_item_insert_validation() {
        let store = open_store().await;
        let repo = store.items();

        let err = repo.insert(&NewItem::new("  ")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo.insert(&NewItem::new("大米").quantity(-1.0)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .insert(&NewItem::new("大米").min_quantity(-0.5))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Unknown category is a FK violation, not a silent NULL.
        let err = repo
            .insert(&NewItem::new("大米").category_id(9999))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_low_stock() {
        let store = open_store().await;
        let food = store.item_categories().insert("食品饮料", None).await.unwrap();
        let daily = store.item_categories().insert("日用品", None).await.unwrap();
        let items = store.items();

        items
            .insert(&NewItem::new("牛奶").category_id(food).quantity(8.0).min_quantity(10.0))
            .await
            .unwrap();
        items
            .insert(&NewItem::new("大米").category_id(food).quantity(20.0).min_quantity(5.0))
            .await
            .unwrap();
        // min_quantity 0 disables flagging even at zero stock.
        items
            .insert(&NewItem::new("纸巾").category_id(daily).quantity(0.0))
            .await
            .unwrap();

        let in_food = items.list(ItemFilter::default().category_id(food)).await.unwrap();
        assert_eq!(in_food.len(), 2);
        // Ordered by name: 大米 before 牛奶 (codepoint order).
        assert_eq!(in_food[0].name, "大米");

        let by_keyword = items.list(ItemFilter::default().keyword("牛")).await.unwrap();
        assert_eq!(by_keyword.len(), 1);
        assert_eq!(by_keyword[0].name, "牛奶");

        let low = items.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "牛奶");

        assert_eq!(items.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_patch_update_and_detach() {
        let store = open_store().await;
        let cat = store.item_categories().insert("食品饮料", None).await.unwrap();
        let items = store.items();

        let id = items
            .insert(&NewItem::new("牛奶").category_id(cat).quantity(8.0))
            .await
            .unwrap();

        let affected = items
            .update(
                id,
                ItemPatch::default()
                    .name("鲜牛奶")
                    .category_id(None)
                    .unit("升")
                    .unit_price(Money::from_cents(680))
                    .min_quantity(2.0)
                    .description(Some("冷藏".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let after = items.get(id).await.unwrap().unwrap();
        assert_eq!(after.name, "鲜牛奶");
        assert_eq!(after.category_id, None);
        assert_eq!(after.category_name, None);
        assert_eq!(after.unit, "升");
        assert_eq!(after.unit_price_cents, 680);
        assert_eq!(after.min_quantity, 2.0);
        assert_eq!(after.description.as_deref(), Some("冷藏"));
        // Quantity is untouched by patches.
        assert_eq!(after.quantity, 8.0);

        assert_eq!(items.update(id, ItemPatch::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_category_delete_detaches_items() {
        let store = open_store().await;
        let cat = store.item_categories().insert("食品饮料", None).await.unwrap();
        let id = store
            .items()
            .insert(&NewItem::new("牛奶").category_id(cat).quantity(8.0))
            .await
            .unwrap();

        store.item_categories().delete(cat).await.unwrap();

        let milk = store.items().get(id).await.unwrap().expect("item survives");
        assert_eq!(milk.category_id, None);
        assert_eq!(milk.category_name, None);
    }
}

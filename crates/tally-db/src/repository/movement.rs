//! # Inventory Movement Repository
//!
//! Append-only stock movement log plus the stored quantity it drives.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(NewMovement)                                                    │
//! │                                                                         │
//! │    BEGIN ──► INSERT movement row                                        │
//! │          ──► UPDATE items.quantity += signed delta (+in / -out)         │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  Both writes land or neither does: the log and the stored quantity      │
//! │  cannot diverge through this path. reconcile() audits the invariant by  │
//! │  replaying the full log and rewriting the stored quantity.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tally_core::validation::{validate_quantity, validate_text};
use tally_core::{Movement, MovementFilter, NewMovement, Reconciliation};

/// Columns selected for every movement read, with the item and its category
/// joined in for display.
const MOVEMENT_SELECT: &str = "SELECT m.id, m.item_id, i.name AS item_name, \
     ic.name AS category_name, m.direction, m.quantity, m.unit_price_cents, \
     m.reason, m.date, m.created_at \
     FROM movements m \
     LEFT JOIN items i ON m.item_id = i.id \
     LEFT JOIN item_categories ic ON i.category_id = ic.id";

/// Repository for inventory movement operations.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement and applies its delta to the item's stored
    /// quantity, in one transaction. Returns the movement id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - non-positive quantity, oversized reason
    /// * `DbError::ForeignKey` - the item does not exist (nothing persisted)
    pub async fn record(&self, movement: &NewMovement) -> DbResult<i64> {
        validate_quantity(movement.quantity)?;
        if let Some(reason) = &movement.reason {
            validate_text("reason", reason)?;
        }

        debug!(
            item_id = movement.item_id,
            direction = movement.direction.as_str(),
            quantity = movement.quantity,
            "Recording movement"
        );

        let now = Utc::now();
        let delta = movement.direction.signed(movement.quantity);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO movements (item_id, direction, quantity, unit_price_cents, reason, date, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(movement.item_id)
        .bind(movement.direction)
        .bind(movement.quantity)
        .bind(movement.unit_price.cents())
        .bind(&movement.reason)
        .bind(movement.date)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        let updated = sqlx::query("UPDATE items SET quantity = quantity + ?1, updated_at = ?2 WHERE id = ?3")
            .bind(delta)
            .bind(now)
            .bind(movement.item_id)
            .execute(&mut *tx)
            .await?;
        // The FK on the insert already rejects unknown items; this guards the
        // quantity write against racing deletes within the same transaction.
        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("item", movement.item_id));
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Lists movements matching the filter, newest first.
    pub async fn list(&self, filter: MovementFilter) -> DbResult<Vec<Movement>> {
        let mut sql = format!("{MOVEMENT_SELECT} WHERE 1=1");

        if filter.item_id.is_some() {
            sql.push_str(" AND m.item_id = ?");
        }
        if filter.direction.is_some() {
            sql.push_str(" AND m.direction = ?");
        }
        if filter.date_from.is_some() {
            sql.push_str(" AND m.date >= ?");
        }
        if filter.date_to.is_some() {
            sql.push_str(" AND m.date <= ?");
        }
        sql.push_str(" ORDER BY m.date DESC, m.created_at DESC, m.id DESC");
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, Movement>(&sql);
        if let Some(item_id) = filter.item_id {
            query = query.bind(item_id);
        }
        if let Some(direction) = filter.direction {
            query = query.bind(direction);
        }
        if let Some(from) = filter.date_from {
            query = query.bind(from);
        }
        if let Some(to) = filter.date_to {
            query = query.bind(to);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }

        let movements = query.fetch_all(&self.pool).await?;

        debug!(count = movements.len(), "Listed movements");
        Ok(movements)
    }

    /// Replays the item's full movement log, rewrites the stored quantity to
    /// the replayed total, and reports how far it had drifted.
    ///
    /// Stock recorded at item creation outside the log counts as drift: the
    /// log alone is the authority this audit restores.
    pub async fn reconcile(&self, item_id: i64) -> DbResult<Reconciliation> {
        let mut tx = self.pool.begin().await?;

        let recorded: f64 = sqlx::query_scalar("SELECT quantity FROM items WHERE id = ?1")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("item", item_id))?;

        // TOTAL (unlike SUM) is REAL even over zero rows, so an item with an
        // empty movement log decodes cleanly as 0.0.
        let recomputed: f64 = sqlx::query_scalar(
            "SELECT TOTAL(CASE WHEN direction = 'in' THEN quantity ELSE -quantity END) \
             FROM movements WHERE item_id = ?1",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE items SET quantity = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(recomputed)
            .bind(Utc::now())
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let report = Reconciliation {
            item_id,
            recorded,
            recomputed,
        };
        if report.drift() != 0.0 {
            info!(item_id, recorded, recomputed, "Reconciled drifted item quantity");
        }
        Ok(report)
    }

    /// Counts movements (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movements")
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
    use chrono::NaiveDate;
    use tally_core::{Direction, Money, NewItem};

    async fn store_with_milk(quantity: f64) -> (Store, i64) {
        let store = Store::open(StoreConfig::in_memory().seed_defaults(false))
            .await
            .unwrap();
        let cat = store.item_categories().insert("食品饮料", None).await.unwrap();
        let milk = store
            .items()
            .insert(
                &NewItem::new("牛奶")
                    .category_id(cat)
                    .quantity(quantity)
                    .unit("瓶")
                    .min_quantity(10.0),
            )
            .await
            .unwrap();
        (store, milk)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_record_applies_signed_delta() {
        let (store, milk) = store_with_milk(8.0).await;
        let movements = store.movements();

        movements
            .record(
                &NewMovement::new(milk, Direction::In, 5.0, date(2024, 1, 10))
                    .unit_price(Money::from_cents(350))
                    .reason("超市采购"),
            )
            .await
            .unwrap();

        let item = store.items().get(milk).await.unwrap().unwrap();
        assert_eq!(item.quantity, 13.0);
        assert!(!item.is_low_stock());

        movements
            .record(&NewMovement::new(milk, Direction::Out, 4.5, date(2024, 1, 11)))
            .await
            .unwrap();

        let item = store.items().get(milk).await.unwrap().unwrap();
        assert_eq!(item.quantity, 8.5);
        assert!(item.is_low_stock());
    }

    #[tokio::test]
    async fn test_record_unknown_item_persists_nothing() {
        let (store, _) = store_with_milk(8.0).await;
        let movements = store.movements();

        let err = movements
            .record(&NewMovement::new(9999, Direction::In, 1.0, date(2024, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKey(_)));

        assert_eq!(movements.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_rejects_non_positive_quantity() {
        let (store, milk) = store_with_milk(8.0).await;

        for quantity in [0.0, -2.0] {
            let err = store
                .movements()
                .record(&NewMovement::new(milk, Direction::In, quantity, date(2024, 1, 1)))
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_list_filters_and_enrichment() {
        let (store, milk) = store_with_milk(8.0).await;
        let rice = store.items().insert(&NewItem::new("大米")).await.unwrap();
        let movements = store.movements();

        movements
            .record(&NewMovement::new(milk, Direction::In, 5.0, date(2024, 1, 10)))
            .await
            .unwrap();
        movements
            .record(&NewMovement::new(milk, Direction::Out, 2.0, date(2024, 1, 12)))
            .await
            .unwrap();
        movements
            .record(&NewMovement::new(rice, Direction::In, 10.0, date(2024, 1, 11)))
            .await
            .unwrap();

        let all = movements.list(MovementFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first.
        assert_eq!(all[0].date, date(2024, 1, 12));
        // Enriched with the item and (when present) its category.
        assert_eq!(all[0].item_name.as_deref(), Some("牛奶"));
        assert_eq!(all[0].category_name.as_deref(), Some("食品饮料"));
        // Uncategorized item joins with a NULL category.
        let rice_row = all.iter().find(|m| m.item_id == rice).unwrap();
        assert_eq!(rice_row.item_name.as_deref(), Some("大米"));
        assert_eq!(rice_row.category_name, None);

        let only_milk = movements
            .list(MovementFilter::default().item_id(milk))
            .await
            .unwrap();
        assert_eq!(only_milk.len(), 2);

        let only_in = movements
            .list(MovementFilter::default().direction(Direction::In))
            .await
            .unwrap();
        assert_eq!(only_in.len(), 2);

        let window = movements
            .list(MovementFilter::default().date_range(date(2024, 1, 11), date(2024, 1, 12)))
            .await
            .unwrap();
        assert_eq!(window.len(), 2);

        let capped = movements
            .list(MovementFilter::default().limit(1))
            .await
            .unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_item_cascades_to_movements() {
        let (store, milk) = store_with_milk(8.0).await;
        store
            .movements()
            .record(&NewMovement::new(milk, Direction::In, 5.0, date(2024, 1, 10)))
            .await
            .unwrap();

        store.items().delete(milk).await.unwrap();
        assert_eq!(store.movements().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_restores_log_authority() {
        // Starting stock of 8 was never recorded as a movement, so the log
        // says less than the stored quantity.
        let (store, milk) = store_with_milk(8.0).await;
        let movements = store.movements();

        movements
            .record(&NewMovement::new(milk, Direction::In, 5.0, date(2024, 1, 10)))
            .await
            .unwrap();
        movements
            .record(&NewMovement::new(milk, Direction::Out, 2.0, date(2024, 1, 11)))
            .await
            .unwrap();

        let report = movements.reconcile(milk).await.unwrap();
        assert_eq!(report.recorded, 11.0);
        assert_eq!(report.recomputed, 3.0);
        assert_eq!(report.drift(), 8.0);

        let item = store.items().get(milk).await.unwrap().unwrap();
        assert_eq!(item.quantity, 3.0);

        // A second pass finds no drift.
        let report = movements.reconcile(milk).await.unwrap();
        assert_eq!(report.drift(), 0.0);
    }

    #[tokio::test]
    async fn test_reconcile_unknown_item() {
        let (store, _) = store_with_milk(8.0).await;

        let err = store.movements().reconcile(9999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reconcile_empty_log_zeroes_quantity() {
        let (store, milk) = store_with_milk(8.0).await;

        let report = store.movements().reconcile(milk).await.unwrap();
        assert_eq!(report.recomputed, 0.0);
        assert_eq!(store.items().get(milk).await.unwrap().unwrap().quantity, 0.0);
    }
}

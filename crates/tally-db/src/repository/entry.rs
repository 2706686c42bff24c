//! # Ledger Entry Repository
//!
//! Database operations for income/expense entries and their aggregates.
//!
//! ## Listing & Summaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Query Surfaces                                │
//! │                                                                         │
//! │  list(filter)                                                          │
//! │    kind / category / date range / keyword / limit                      │
//! │    └── rows enriched with category name + color (LEFT JOIN)            │
//! │        newest first: date DESC, created_at DESC, id DESC               │
//! │                                                                         │
//! │  summarize(start, end)                                                 │
//! │    └── one row per kind PRESENT in range (absent kinds omitted)        │
//! │                                                                         │
//! │  summarize_by_category(start, end, kind?)                              │
//! │    └── one row per category, INCLUDING zero categories (LEFT JOIN),    │
//! │        ordered by total DESC                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tally_core::validation::{validate_amount, validate_date_range, validate_text};
use tally_core::{CategorySummary, Entry, EntryFilter, EntryKind, EntryPatch, KindSummary, NewEntry};

/// Columns selected for every entry read, including the joined category.
const ENTRY_SELECT: &str = "SELECT e.id, e.kind, e.amount_cents, e.category_id, \
     c.name AS category_name, c.color AS category_color, \
     e.description, e.date, e.created_at, e.updated_at \
     FROM entries e LEFT JOIN categories c ON e.category_id = c.id";

/// Repository for ledger entry operations.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    pool: SqlitePool,
}

impl EntryRepository {
    /// Creates a new EntryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EntryRepository { pool }
    }

    /// Lists entries matching the filter, newest first.
    ///
    /// The keyword is a substring match against the entry description OR the
    /// joined category name (case sensitivity follows SQLite's LIKE default:
    /// ASCII-insensitive, exact elsewhere).
    pub async fn list(&self, filter: EntryFilter) -> DbResult<Vec<Entry>> {
        let mut sql = format!("{ENTRY_SELECT} WHERE 1=1");

        if filter.kind.is_some() {
            sql.push_str(" AND e.kind = ?");
        }
        if filter.category_id.is_some() {
            sql.push_str(" AND e.category_id = ?");
        }
        if filter.date_from.is_some() {
            sql.push_str(" AND e.date >= ?");
        }
        if filter.date_to.is_some() {
            sql.push_str(" AND e.date <= ?");
        }
        if filter.keyword.is_some() {
            sql.push_str(" AND (e.description LIKE ? OR c.name LIKE ?)");
        }
        // id breaks created_at ties by insertion order
        sql.push_str(" ORDER BY e.date DESC, e.created_at DESC, e.id DESC");
        if filter.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query_as::<_, Entry>(&sql);
        if let Some(kind) = filter.kind {
            query = query.bind(kind);
        }
        if let Some(category_id) = filter.category_id {
            query = query.bind(category_id);
        }
        if let Some(from) = filter.date_from {
            query = query.bind(from);
        }
        if let Some(to) = filter.date_to {
            query = query.bind(to);
        }
        if let Some(keyword) = &filter.keyword {
            let pattern = format!("%{}%", keyword.trim());
            query = query.bind(pattern.clone()).bind(pattern);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }

        let entries = query.fetch_all(&self.pool).await?;

        debug!(count = entries.len(), "Listed entries");
        Ok(entries)
    }

    /// Gets an entry by id (enriched with its category).
    pub async fn get(&self, id: i64) -> DbResult<Option<Entry>> {
        let sql = format!("{ENTRY_SELECT} WHERE e.id = ?1");
        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Inserts a ledger entry and returns its id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - non-positive amount, oversized description
    /// * `DbError::ForeignKey` - category does not exist
    /// * `DbError::Check` - backstop if a non-positive amount reaches SQL
    pub async fn insert(&self, entry: &NewEntry) -> DbResult<i64> {
        validate_amount(entry.amount)?;
        if let Some(description) = &entry.description {
            validate_text("description", description)?;
        }

        debug!(
            kind = entry.kind.as_str(),
            amount_cents = entry.amount.cents(),
            category_id = entry.category_id,
            "Inserting entry"
        );

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO entries (kind, amount_cents, category_id, description, date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(entry.kind)
        .bind(entry.amount.cents())
        .bind(entry.category_id)
        .bind(&entry.description)
        .bind(entry.date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Applies a sparse patch and bumps `updated_at`. Returns affected rows:
    /// 0 for an unknown id or an empty patch.
    pub async fn update(&self, id: i64, patch: EntryPatch) -> DbResult<u64> {
        if patch.is_empty() {
            return Ok(0);
        }
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        if let Some(Some(description)) = &patch.description {
            validate_text("description", description)?;
        }

        debug!(id, "Updating entry");

        let mut sets = Vec::new();
        if patch.kind.is_some() {
            sets.push("kind = ?");
        }
        if patch.amount.is_some() {
            sets.push("amount_cents = ?");
        }
        if patch.category_id.is_some() {
            sets.push("category_id = ?");
        }
        if patch.description.is_some() {
            sets.push("description = ?");
        }
        if patch.date.is_some() {
            sets.push("date = ?");
        }
        sets.push("updated_at = ?");
        let sql = format!("UPDATE entries SET {} WHERE id = ?", sets.join(", "));

        let mut query = sqlx::query(&sql);
        if let Some(kind) = patch.kind {
            query = query.bind(kind);
        }
        if let Some(amount) = patch.amount {
            query = query.bind(amount.cents());
        }
        if let Some(category_id) = patch.category_id {
            query = query.bind(category_id);
        }
        if let Some(description) = patch.description {
            // Some(None) clears the column
            query = query.bind(description);
        }
        if let Some(date) = patch.date {
            query = query.bind(date);
        }
        query = query.bind(Utc::now()).bind(id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Hard-deletes an entry. Returns affected rows (0 if absent).
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting entry");

        let result = sqlx::query("DELETE FROM entries WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Per-kind totals over an inclusive date range.
    ///
    /// Kinds with no entries in the range are omitted, not returned as zero;
    /// the per-category summary is the surface that reports zeros.
    pub async fn summarize(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<KindSummary>> {
        validate_date_range(start, end)?;

        let summaries = sqlx::query_as::<_, KindSummary>(
            "SELECT kind, COALESCE(SUM(amount_cents), 0) AS total_cents, COUNT(*) AS count \
             FROM entries WHERE date BETWEEN ?1 AND ?2 GROUP BY kind",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Per-category totals over an inclusive date range, optionally limited
    /// to one kind of category.
    ///
    /// Every (matching) category appears, with zero total/count when nothing
    /// was recorded in range. Ordered by total descending.
    pub async fn summarize_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        kind: Option<EntryKind>,
    ) -> DbResult<Vec<CategorySummary>> {
        validate_date_range(start, end)?;

        let mut sql = String::from(
            "SELECT c.id AS category_id, c.name, c.color, \
             COALESCE(SUM(e.amount_cents), 0) AS total_cents, \
             COUNT(e.id) AS count \
             FROM categories c \
             LEFT JOIN entries e ON e.category_id = c.id AND e.date BETWEEN ?1 AND ?2",
        );
        if kind.is_some() {
            sql.push_str(" WHERE c.kind = ?3");
        }
        sql.push_str(" GROUP BY c.id, c.name, c.color ORDER BY total_cents DESC");

        let mut query = sqlx::query_as::<_, CategorySummary>(&sql).bind(start).bind(end);
        if let Some(kind) = kind {
            query = query.bind(kind);
        }

        let summaries = query.fetch_all(&self.pool).await?;
        Ok(summaries)
    }

    /// Counts entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

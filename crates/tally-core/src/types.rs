//! # Domain Types
//!
//! Core record types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Ledger side                      Inventory side                        │
//! │  ┌─────────────────┐              ┌─────────────────┐                   │
//! │  │    Category     │◄────┐        │  ItemCategory   │◄────┐             │
//! │  │  name (unique)  │     │        │  name (unique)  │     │             │
//! │  │  kind, color    │     │        └─────────────────┘     │             │
//! │  └─────────────────┘     │        ┌─────────────────┐     │             │
//! │  ┌─────────────────┐     │        │      Item       │─────┘             │
//! │  │     Entry       │─────┘        │  quantity, unit │◄────┐             │
//! │  │  kind, amount   │              │  min_quantity   │     │             │
//! │  │  date           │              └─────────────────┘     │             │
//! │  └─────────────────┘              ┌─────────────────┐     │             │
//! │                                   │    Movement     │─────┘             │
//! │  ┌─────────────────┐              │  direction      │                   │
//! │  │    Setting      │              │  quantity, date │                   │
//! │  │  key → value    │              └─────────────────┘                   │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three shapes per entity, all plain data:
//! - the persisted record (`Entry`, `Item`, ...) returned by queries as a
//!   detached value copy
//! - a `New*` struct for inserts
//! - a `*Patch` struct enumerating only the legitimately mutable fields,
//!   so an arbitrary column name can never reach a query

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::{DEFAULT_CATEGORY_COLOR, DEFAULT_ITEM_UNIT};

// =============================================================================
// Entry Kind
// =============================================================================

/// Whether a ledger entry (or its category) records income or expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// The storage/wire spelling ("income" / "expense").
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

// =============================================================================
// Movement Direction
// =============================================================================

/// Stock movement direction. Drives the sign of the quantity delta applied
/// to the owning item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock increase (purchase, restock).
    In,
    /// Stock decrease (consumption, disposal).
    Out,
}

impl Direction {
    /// The storage/wire spelling ("in" / "out").
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    /// Applies the direction's sign to a quantity.
    pub fn signed(&self, quantity: f64) -> f64 {
        match self {
            Direction::In => quantity,
            Direction::Out => -quantity,
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A ledger category ("工资", "餐饮", ...). Names are unique store-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: EntryKind,
    /// Display color as a `#rrggbb` hex string.
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub kind: EntryKind,
    pub color: String,
}

impl NewCategory {
    /// Creates a category payload with the default color.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        NewCategory {
            name: name.into(),
            kind,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Mutable category fields. The kind of a category is fixed at creation:
/// flipping income↔expense under existing entries would silently reclassify
/// history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One income or expense record in the ledger.
///
/// `category_name` / `category_color` are denormalized from the joined
/// category at query time; they are `None` only if the referenced category
/// row has gone missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Entry {
    pub id: i64,
    pub kind: EntryKind,
    /// Amount in cents; strictly positive (enforced by a CHECK constraint).
    pub amount_cents: i64,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub description: Option<String>,
    /// The day the income/expense occurred (not when it was recorded).
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Returns the amount as a Money type.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Payload for inserting a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub amount: Money,
    pub category_id: i64,
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Mutable ledger entry fields. `None` leaves a field untouched; for the
/// nullable description, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    pub kind: Option<EntryKind>,
    pub amount: Option<Money>,
    pub category_id: Option<i64>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }

    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category_id(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Filter for listing ledger entries. All fields optional; an empty filter
/// lists everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryFilter {
    pub kind: Option<EntryKind>,
    pub category_id: Option<i64>,
    /// Inclusive lower bound on `date`.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `date`.
    pub date_to: Option<NaiveDate>,
    /// Substring match against the description OR the joined category name.
    pub keyword: Option<String>,
    /// Cap on the number of rows returned (newest first).
    pub limit: Option<u32>,
}

impl EntryFilter {
    pub fn kind(mut self, kind: EntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category_id(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Per-kind aggregate over a date range. Kinds with no matching entries are
/// omitted entirely (GROUP BY semantics), not returned as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct KindSummary {
    pub kind: EntryKind,
    pub total_cents: i64,
    pub count: i64,
}

impl KindSummary {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Per-category aggregate over a date range. Categories with no matching
/// entries ARE included (LEFT JOIN) with zero total and count, so the UI can
/// render a complete breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategorySummary {
    pub category_id: i64,
    pub name: String,
    pub color: String,
    pub total_cents: i64,
    pub count: i64,
}

impl CategorySummary {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Item Category
// =============================================================================

/// An inventory item category ("食品饮料", "日用品", ...). Names are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Item
// =============================================================================

/// One trackable inventory good with a quantity and a reorder threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Nullable: uncategorized items are allowed, and deleting an item
    /// category nulls this out rather than deleting the item.
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    /// Current stock level. May legitimately be fractional (1.5 kg) and may
    /// go negative if consumption is recorded ahead of a purchase.
    pub quantity: f64,
    pub unit: String,
    pub unit_price_cents: i64,
    /// Reorder threshold. Zero disables low-stock flagging entirely.
    pub min_quantity: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Low stock = at or below a positive threshold.
    ///
    /// An item with `min_quantity == 0` is never low, regardless of quantity.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.min_quantity > 0.0 && self.quantity <= self.min_quantity
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Payload for inserting an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category_id: Option<i64>,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: Money,
    pub min_quantity: f64,
    pub description: Option<String>,
}

impl NewItem {
    /// Creates an item payload with zero stock, no threshold, and the
    /// default unit.
    pub fn new(name: impl Into<String>) -> Self {
        NewItem {
            name: name.into(),
            category_id: None,
            quantity: 0.0,
            unit: DEFAULT_ITEM_UNIT.to_string(),
            unit_price: Money::zero(),
            min_quantity: 0.0,
            description: None,
        }
    }

    pub fn category_id(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = price;
        self
    }

    pub fn min_quantity(mut self, min: f64) -> Self {
        self.min_quantity = min;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Mutable item fields. For the nullable `category_id` and `description`,
/// `Some(None)` clears the column.
///
/// Note `quantity` is deliberately absent: stock levels change through
/// movements (or `reconcile`), never by direct edit, so the movement log
/// stays authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub unit: Option<String>,
    pub unit_price: Option<Money>,
    pub min_quantity: Option<f64>,
    pub description: Option<Option<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.unit.is_none()
            && self.unit_price.is_none()
            && self.min_quantity.is_none()
            && self.description.is_none()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category_id(mut self, id: Option<i64>) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn min_quantity(mut self, min: f64) -> Self {
        self.min_quantity = Some(min);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }
}

/// Filter for listing items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    pub category_id: Option<i64>,
    /// Substring match against the item name OR description.
    pub keyword: Option<String>,
    /// Only items where `quantity <= min_quantity AND min_quantity > 0`.
    pub low_stock_only: bool,
}

impl ItemFilter {
    pub fn category_id(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn low_stock_only(mut self) -> Self {
        self.low_stock_only = true;
        self
    }
}

// =============================================================================
// Inventory Movement
// =============================================================================

/// An append-only record of a stock increase ("in") or decrease ("out") for
/// one item. Queries enrich each row with the item's name and the item's
/// category name via LEFT JOINs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: i64,
    pub item_id: i64,
    pub item_name: Option<String>,
    pub category_name: Option<String>,
    pub direction: Direction,
    /// Always positive; the direction carries the sign.
    pub quantity: f64,
    pub unit_price_cents: i64,
    pub reason: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// The delta this movement applied to the item's quantity.
    #[inline]
    pub fn signed_quantity(&self) -> f64 {
        self.direction.signed(self.quantity)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Payload for recording a movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMovement {
    pub item_id: i64,
    pub direction: Direction,
    pub quantity: f64,
    pub unit_price: Money,
    pub reason: Option<String>,
    pub date: NaiveDate,
}

impl NewMovement {
    pub fn new(item_id: i64, direction: Direction, quantity: f64, date: NaiveDate) -> Self {
        NewMovement {
            item_id,
            direction,
            quantity,
            unit_price: Money::zero(),
            reason: None,
            date,
        }
    }

    pub fn unit_price(mut self, price: Money) -> Self {
        self.unit_price = price;
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Filter for listing movements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub item_id: Option<i64>,
    pub direction: Option<Direction>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl MovementFilter {
    pub fn item_id(mut self, id: i64) -> Self {
        self.item_id = Some(id);
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of auditing an item's quantity against its movement history.
///
/// `recorded` is what the item row said before the audit; `recomputed` is
/// Σ(in) − Σ(out) over the full movement log, which the audit writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub item_id: i64,
    pub recorded: f64,
    pub recomputed: f64,
}

impl Reconciliation {
    /// How far the stored quantity had drifted from the movement log.
    #[inline]
    pub fn drift(&self) -> f64 {
        self.recorded - self.recomputed
    }
}

// =============================================================================
// Setting
// =============================================================================

/// A key/value preference row ("theme", "currency_symbol", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_spelling() {
        assert_eq!(EntryKind::Income.as_str(), "income");
        assert_eq!(EntryKind::Expense.as_str(), "expense");
        assert_eq!(Direction::In.as_str(), "in");
        assert_eq!(Direction::Out.as_str(), "out");
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::In.signed(5.0), 5.0);
        assert_eq!(Direction::Out.signed(5.0), -5.0);
    }

    #[test]
    fn test_low_stock_rule() {
        let mut item = Item {
            id: 1,
            name: "牛奶".to_string(),
            category_id: None,
            category_name: None,
            quantity: 8.0,
            unit: "盒".to_string(),
            unit_price_cents: 350,
            min_quantity: 10.0,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(item.is_low_stock());

        item.quantity = 13.0;
        assert!(!item.is_low_stock());

        // A zero threshold never flags, even at zero or negative stock.
        item.min_quantity = 0.0;
        item.quantity = -2.0;
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_empty_patches() {
        assert!(EntryPatch::default().is_empty());
        assert!(ItemPatch::default().is_empty());
        assert!(CategoryPatch::default().is_empty());
        assert!(!EntryPatch::default().amount(Money::from_cents(100)).is_empty());
    }

    #[test]
    fn test_kind_serde_spelling() {
        assert_eq!(serde_json::to_string(&EntryKind::Income).unwrap(), "\"income\"");
        assert_eq!(serde_json::to_string(&Direction::Out).unwrap(), "\"out\"");
    }
}

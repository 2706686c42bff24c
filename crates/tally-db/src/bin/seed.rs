//! # Demo Data Generator
//!
//! Populates a Tally database with realistic household data for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db with 3 months of history (default)
//! cargo run -p tally-db --bin seed
//!
//! # Generate a longer history
//! cargo run -p tally-db --bin seed -- --months 12
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Data
//! - The default ledger and item categories (same seed as every startup)
//! - One salary entry and a spread of expense entries per month
//! - A small pantry of inventory items, some below their reorder threshold
//! - Purchase and consumption movements so stock levels have a history

use chrono::{Datelike, Duration, NaiveDate, Utc};
use std::env;
use tally_core::{Direction, EntryFilter, EntryKind, Money, NewEntry, NewItem, NewMovement};
use tally_db::{Store, StoreConfig};

/// (category name, description, amount range in cents) per expense template.
const EXPENSE_TEMPLATES: &[(&str, &str, i64, i64)] = &[
    ("餐饮", "超市采购", 8_000, 35_000),
    ("餐饮", "外卖", 2_500, 8_000),
    ("交通", "地铁充值", 5_000, 10_000),
    ("交通", "打车", 1_800, 6_500),
    ("居住", "水电燃气", 15_000, 40_000),
    ("购物", "日用品", 3_000, 20_000),
    ("娱乐", "电影", 4_000, 12_000),
    ("医疗", "药店", 2_000, 15_000),
];

/// (name, category, quantity, unit, unit price cents, min quantity).
const PANTRY: &[(&str, &str, f64, &str, i64, f64)] = &[
    ("牛奶", "食品饮料", 8.0, "瓶", 350, 10.0),
    ("大米", "食品饮料", 12.5, "kg", 680, 5.0),
    ("鸡蛋", "食品饮料", 30.0, "个", 120, 12.0),
    ("洗衣液", "日用品", 1.0, "瓶", 2_990, 1.0),
    ("纸巾", "日用品", 6.0, "包", 450, 4.0),
    ("感冒药", "其他", 2.0, "盒", 1_580, 1.0),
];

/// Deterministic pseudo-random in [lo, hi], keyed on the inputs. Keeps the
/// demo data varied without pulling a RNG crate into the store.
fn vary(lo: i64, hi: i64, key: i64) -> i64 {
    let span = (hi - lo).max(1);
    lo + (key.wrapping_mul(2_654_435_761) & i64::MAX) % span
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut months: u32 = 3;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--months" | "-m" => {
                if i + 1 < args.len() {
                    months = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally Demo Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -m, --months <N>   Months of ledger history (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("🌱 Tally Demo Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Months:   {}", months);
    println!();

    // Opening runs migrations and the idempotent category seed.
    let store = Store::open(StoreConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied, default categories seeded");

    let existing = store.entries().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} entries", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let start = std::time::Instant::now();

    // ── Ledger history ───────────────────────────────────────────────────
    println!();
    println!("Generating ledger entries...");

    let salary = store
        .categories()
        .find_by_name("工资")
        .await?
        .ok_or("default category 工资 missing")?;

    let mut entries = 0;
    for month_back in 0..months {
        let anchor = today - Duration::days(30 * month_back as i64);
        let payday =
            NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 10).unwrap_or(anchor);

        store
            .entries()
            .insert(&NewEntry {
                kind: EntryKind::Income,
                amount: Money::from_cents(850_000),
                category_id: salary.id,
                description: Some(format!("{}月工资", anchor.month())),
                date: payday,
            })
            .await?;
        entries += 1;

        for (idx, (category_name, description, lo, hi)) in EXPENSE_TEMPLATES.iter().enumerate() {
            let category = store
                .categories()
                .find_by_name(category_name)
                .await?
                .ok_or_else(|| format!("default category {category_name} missing"))?;
            let key = (month_back as i64 + 1) * 100 + idx as i64;
            let day = 1 + (vary(0, 27, key) as u32);
            let date = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), day)
                .unwrap_or(anchor);

            store
                .entries()
                .insert(&NewEntry {
                    kind: EntryKind::Expense,
                    amount: Money::from_cents(vary(*lo, *hi, key)),
                    category_id: category.id,
                    description: Some((*description).to_string()),
                    date,
                })
                .await?;
            entries += 1;
        }
    }

    println!("  Generated {} entries", entries);

    // ── Inventory ────────────────────────────────────────────────────────
    println!();
    println!("Generating inventory...");

    let mut movements = 0;
    for (idx, (name, category_name, quantity, unit, price, min)) in PANTRY.iter().enumerate() {
        let category = store
            .item_categories()
            .list()
            .await?
            .into_iter()
            .find(|c| c.name == *category_name)
            .ok_or_else(|| format!("default item category {category_name} missing"))?;

        let item_id = store
            .items()
            .insert(
                &NewItem::new(*name)
                    .category_id(category.id)
                    .quantity(0.0)
                    .unit(*unit)
                    .unit_price(Money::from_cents(*price))
                    .min_quantity(*min),
            )
            .await?;

        // Arrive at today's stock through the log: one purchase, one partial
        // consumption, so reconcile() finds no drift on demo data.
        let bought = quantity + (idx as f64 + 1.0);
        store
            .movements()
            .record(
                &NewMovement::new(item_id, Direction::In, bought, today - Duration::days(14))
                    .unit_price(Money::from_cents(*price))
                    .reason("采购入库"),
            )
            .await?;
        store
            .movements()
            .record(
                &NewMovement::new(
                    item_id,
                    Direction::Out,
                    idx as f64 + 1.0,
                    today - Duration::days(3),
                )
                .reason("日常消耗"),
            )
            .await?;
        movements += 2;
    }

    println!("  Generated {} items, {} movements", PANTRY.len(), movements);

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seeded in {:?}", elapsed);

    // ── Verify ───────────────────────────────────────────────────────────
    println!();
    println!("Verifying...");

    println!("  Categories:    {}", store.categories().count().await?);
    println!("  Entries:       {}", store.entries().count().await?);
    println!("  Items:         {}", store.items().count().await?);
    println!("  Movements:     {}", store.movements().count().await?);

    let recent = store.entries().list(EntryFilter::default().limit(5)).await?;
    println!("  Recent entries: {}", recent.len());

    let low = store.items().list_low_stock().await?;
    println!("  Low-stock items: {}", low.len());
    for item in &low {
        println!("    ⚠ {} ({} {} ≤ {})", item.name, item.quantity, item.unit, item.min_quantity);
    }

    store.close().await;
    println!();
    println!("Done.");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::seed::{DEFAULT_CATEGORIES, DEFAULT_ITEM_CATEGORIES};

    // The generator looks its categories up by name; every name in the demo
    // tables must exist in the default seed or the run aborts half-seeded.
    #[test]
    fn test_demo_tables_only_use_seeded_categories() {
        for (name, category, ..) in PANTRY {
            assert!(
                DEFAULT_ITEM_CATEGORIES.iter().any(|c| c.name == *category),
                "{name} references unseeded item category {category}"
            );
        }
        for (category, description, ..) in EXPENSE_TEMPLATES {
            assert!(
                DEFAULT_CATEGORIES.iter().any(|c| c.name == *category),
                "{description} references unseeded category {category}"
            );
        }
    }

    #[test]
    fn test_vary_stays_in_range() {
        for key in 0..500 {
            let v = vary(2_500, 8_000, key);
            assert!((2_500..=8_000).contains(&v));
        }
    }
}

//! # Default Seed Tables
//!
//! The fixed category lists inserted idempotently the first time a store is
//! opened. Seeding is insert-if-absent by unique name: user renames, recolors,
//! and additions are never overwritten by a later startup.
//!
//! The lists mirror the categories the application has always shipped with;
//! the store also accepts caller-supplied tables for customized deployments.

use crate::types::EntryKind;

/// One default ledger category.
#[derive(Debug, Clone, Copy)]
pub struct SeedCategory<'a> {
    pub name: &'a str,
    pub kind: EntryKind,
    pub color: &'a str,
}

/// One default inventory item category.
#[derive(Debug, Clone, Copy)]
pub struct SeedItemCategory<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Color for income categories.
pub const INCOME_COLOR: &str = "#52c41a";

/// Color for expense categories.
pub const EXPENSE_COLOR: &str = "#ff4d4f";

/// Default ledger categories: four income, eight expense.
pub const DEFAULT_CATEGORIES: &[SeedCategory<'static>] = &[
    SeedCategory { name: "工资", kind: EntryKind::Income, color: INCOME_COLOR },
    SeedCategory { name: "奖金", kind: EntryKind::Income, color: INCOME_COLOR },
    SeedCategory { name: "投资收益", kind: EntryKind::Income, color: INCOME_COLOR },
    SeedCategory { name: "其他收入", kind: EntryKind::Income, color: INCOME_COLOR },
    SeedCategory { name: "餐饮", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "购物", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "交通", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "居住", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "医疗", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "教育", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "娱乐", kind: EntryKind::Expense, color: EXPENSE_COLOR },
    SeedCategory { name: "其他支出", kind: EntryKind::Expense, color: EXPENSE_COLOR },
];

/// Default inventory item categories.
pub const DEFAULT_ITEM_CATEGORIES: &[SeedItemCategory<'static>] = &[
    SeedItemCategory { name: "食品饮料", description: "各类食品和饮料" },
    SeedItemCategory { name: "日用品", description: "日常生活用品" },
    SeedItemCategory { name: "服装鞋帽", description: "服装、鞋子、帽子等" },
    SeedItemCategory { name: "电子产品", description: "电子设备和配件" },
    SeedItemCategory { name: "家居用品", description: "家具和家居装饰" },
    SeedItemCategory { name: "学习用品", description: "书籍、文具等" },
    SeedItemCategory { name: "其他", description: "其他物品" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_names_are_unique() {
        let names: HashSet<_> = DEFAULT_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), DEFAULT_CATEGORIES.len());

        let names: HashSet<_> = DEFAULT_ITEM_CATEGORIES.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), DEFAULT_ITEM_CATEGORIES.len());
    }

    #[test]
    fn test_seed_kind_split() {
        let income = DEFAULT_CATEGORIES
            .iter()
            .filter(|c| c.kind == EntryKind::Income)
            .count();
        assert_eq!(income, 4);
        assert_eq!(DEFAULT_CATEGORIES.len() - income, 8);
    }
}

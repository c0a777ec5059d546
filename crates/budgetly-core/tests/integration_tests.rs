//! Integration tests for budgetly-core
//!
//! These tests exercise the full scan → merge → verify workflow against SQLite.

use std::collections::BTreeMap;

use budgetly_core::{
    db::Database,
    dedupe::{Deduplicator, MERGE_AUDIT_ACTION},
    models::Month,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

/// Budget amounts by month for a category
fn budget_map(db: &Database, category_id: i64) -> BTreeMap<Month, Decimal> {
    db.list_budgets(category_id)
        .unwrap()
        .into_iter()
        .map(|b| (b.month, b.amount))
        .collect()
}

#[test]
fn test_food_scenario_end_to_end() {
    let db = Database::in_memory().expect("Failed to create test database");

    let a = db
        .create_category_at(Some("u1"), "Food", Some("#fff"), at(0))
        .unwrap();
    let b = db
        .create_category_at(Some("u1"), "food", Some("#FFF"), at(1))
        .unwrap();
    db.set_budget(a, month("2024-01"), dec("100")).unwrap();
    db.set_budget(b, month("2024-01"), dec("50")).unwrap();
    db.set_budget(b, month("2024-02"), dec("30")).unwrap();
    let tx = db
        .create_transaction(Some(b), day(), "Market", dec("-18.75"))
        .unwrap();

    let report = Deduplicator::new(&db).run().unwrap();

    assert_eq!(report.groups_found, 1);
    assert_eq!(report.merged.len(), 1);
    assert!(!report.has_failures());
    assert_eq!(report.merged[0].survivor, a);
    assert_eq!(report.merged[0].removed, vec![b]);

    let budgets = budget_map(&db, a);
    assert_eq!(budgets.len(), 2);
    assert_eq!(budgets[&month("2024-01")], dec("150"));
    assert_eq!(budgets[&month("2024-02")], dec("30"));

    assert!(db.get_category(b).unwrap().is_none());
    assert!(db.list_budgets(b).unwrap().is_empty());

    let moved = db.list_transactions_for_category(a).unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, tx);
    assert_eq!(moved[0].amount, dec("-18.75"));

    let audit = db.list_audit_log(10).unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, MERGE_AUDIT_ACTION);
    assert_eq!(audit[0].entity_id, Some(a));
}

#[test]
fn test_three_way_group_single_row_per_month() {
    let db = Database::in_memory().unwrap();

    let a = db.create_category_at(Some("u1"), "Gifts", None, at(0)).unwrap();
    let b = db.create_category_at(Some("u1"), "gifts", None, at(1)).unwrap();
    let c = db.create_category_at(Some("u1"), " GIFTS", None, at(2)).unwrap();
    db.set_budget(a, month("2024-01"), dec("1")).unwrap();
    db.set_budget(b, month("2024-12"), dec("200")).unwrap();
    db.set_budget(c, month("2024-12"), dec("75.5")).unwrap();

    let report = Deduplicator::new(&db).run().unwrap();
    assert_eq!(report.merged.len(), 1);
    assert_eq!(report.merged[0].budgets_adopted, 1);
    assert_eq!(report.merged[0].budgets_folded, 1);

    let budgets = db.list_budgets(a).unwrap();
    let december: Vec<_> = budgets
        .iter()
        .filter(|b| b.month == month("2024-12"))
        .collect();
    assert_eq!(december.len(), 1);
    assert_eq!(december[0].amount, dec("275.5"));
    assert_eq!(db.list_categories().unwrap().len(), 1);
}

#[test]
fn test_totals_preserved_per_month() {
    let db = Database::in_memory().unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        let name = if i % 2 == 0 { "Utilities" } else { "utilities " };
        ids.push(
            db.create_category_at(Some("u7"), name, Some("#0AF"), at(i))
                .unwrap(),
        );
    }
    let months = ["2024-01", "2024-02", "2024-03"];
    let mut expected: BTreeMap<Month, Decimal> = BTreeMap::new();
    for (i, id) in ids.iter().enumerate() {
        for (j, m) in months.iter().enumerate() {
            // Skip some months so both fold and adopt paths run
            if (i + j) % 3 == 0 {
                continue;
            }
            let amount = Decimal::new((i * 100 + j * 7 + 1) as i64, 2);
            db.set_budget(*id, month(m), amount).unwrap();
            *expected.entry(month(m)).or_default() += amount;
        }
    }

    Deduplicator::new(&db).run().unwrap();

    assert_eq!(budget_map(&db, ids[0]), expected);
    for id in &ids[1..] {
        assert!(db.get_category(*id).unwrap().is_none());
    }
}

#[test]
fn test_unrelated_categories_untouched() {
    let db = Database::in_memory().unwrap();

    let mine = db.create_category_at(Some("u1"), "Food", None, at(0)).unwrap();
    let theirs = db.create_category_at(Some("u2"), "Food", None, at(1)).unwrap();
    let colored = db
        .create_category_at(Some("u1"), "Food", Some("#f00"), at(2))
        .unwrap();
    db.set_budget(theirs, month("2024-01"), dec("9")).unwrap();

    let report = Deduplicator::new(&db).run().unwrap();

    assert_eq!(report.groups_found, 0);
    assert_eq!(report.to_string(), "No duplicate categories found.\n");
    assert_eq!(db.list_categories().unwrap().len(), 3);
    assert!(db.get_category(mine).unwrap().is_some());
    assert!(db.get_category(colored).unwrap().is_some());
    assert_eq!(budget_map(&db, theirs)[&month("2024-01")], dec("9"));
    assert!(db.list_audit_log(10).unwrap().is_empty());
}

#[test]
fn test_second_run_finds_nothing() {
    let db = Database::in_memory().unwrap();

    let a = db.create_category_at(Some("u1"), "Car", None, at(0)).unwrap();
    let b = db.create_category_at(Some("u1"), "car", None, at(1)).unwrap();
    db.set_budget(a, month("2024-03"), dec("40")).unwrap();
    db.set_budget(b, month("2024-03"), dec("60")).unwrap();
    db.create_transaction(Some(b), day(), "Fuel", dec("-55"))
        .unwrap();

    let first = Deduplicator::new(&db).run().unwrap();
    assert_eq!(first.merged.len(), 1);
    let stats_after_first = db.get_stats().unwrap();

    let second = Deduplicator::new(&db).run().unwrap();
    assert_eq!(second.groups_found, 0);

    let stats_after_second = db.get_stats().unwrap();
    assert_eq!(
        stats_after_first.total_categories,
        stats_after_second.total_categories
    );
    assert_eq!(
        stats_after_first.total_budgets,
        stats_after_second.total_budgets
    );
    assert_eq!(budget_map(&db, a)[&month("2024-03")], dec("100"));
    assert_eq!(db.list_audit_log(10).unwrap().len(), 1);
}

#[test]
fn test_plan_reports_groups_without_writing() {
    let db = Database::in_memory().unwrap();

    let a = db.create_category_at(None, "Misc", None, at(0)).unwrap();
    let b = db.create_category_at(None, "misc", None, at(5)).unwrap();

    let groups = Deduplicator::new(&db).plan().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].survivor, a);
    assert_eq!(groups[0].removals, vec![b]);
    assert_eq!(groups[0].owner_id(), "");

    assert_eq!(db.list_categories().unwrap().len(), 2);
}

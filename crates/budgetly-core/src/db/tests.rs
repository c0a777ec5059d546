//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CategoryStore, MergeOps};
    use chrono::{NaiveDate, TimeZone};
    use rusqlite::params;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_categories().unwrap().is_empty());
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_categories, 0);
        assert_eq!(stats.total_budgets, 0);
        assert_eq!(stats.total_transactions, 0);
        assert!(!db.is_encrypted());
    }

    #[test]
    fn test_keyed_database_reports_encrypted() {
        let path =
            std::env::temp_dir().join(format!("budgetly_keyed_{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new_with_key(&path.to_string_lossy(), Some("passphrase")).unwrap();
        assert!(db.is_encrypted());
        db.create_category(Some("u1"), "Food", None).unwrap();
        assert_eq!(db.list_categories().unwrap().len(), 1);

        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('categories') WHERE name IN ('id', 'owner_id', 'name', 'color', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 5, "categories table should have 5 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('budgets') WHERE name IN ('id', 'category_id', 'month', 'amount')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 4, "budgets table should have 4 expected columns");
    }

    #[test]
    fn test_category_crud() {
        let db = Database::in_memory().unwrap();

        let later = db
            .create_category_at(Some("u1"), "Rent", Some("#000"), at(60))
            .unwrap();
        let earlier = db
            .create_category_at(Some("u1"), "Food", None, at(0))
            .unwrap();
        let other = db.create_category(Some("u2"), "Food", None).unwrap();

        let category = db.get_category(later).unwrap().unwrap();
        assert_eq!(category.name, "Rent");
        assert_eq!(category.color.as_deref(), Some("#000"));
        assert_eq!(category.owner_id.as_deref(), Some("u1"));
        assert_eq!(category.created_at, at(60));

        // Ordered by creation time, not insertion order
        let ids: Vec<i64> = db.list_categories().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![earlier, later, other]);

        let mine: Vec<i64> = db
            .list_categories_for_owner("u1")
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(mine, vec![earlier, later]);

        assert!(db.get_category(9999).unwrap().is_none());
    }

    #[test]
    fn test_category_without_owner() {
        let db = Database::in_memory().unwrap();
        let id = db.create_category(None, "Legacy", None).unwrap();
        let category = db.get_category(id).unwrap().unwrap();
        assert!(category.owner_id.is_none());
    }

    #[test]
    fn test_category_empty_name_rejected() {
        let db = Database::in_memory().unwrap();
        let result = db.create_category(Some("u1"), "   ", None);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_set_budget_upserts() {
        let db = Database::in_memory().unwrap();
        let cat = db.create_category(Some("u1"), "Food", None).unwrap();

        let id = db.set_budget(cat, month("2024-01"), dec("100")).unwrap();
        let again = db.set_budget(cat, month("2024-01"), dec("120.50")).unwrap();
        assert_eq!(id, again);
        db.set_budget(cat, month("2023-12"), dec("80")).unwrap();

        let budgets = db.list_budgets(cat).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].month, month("2023-12"));
        assert_eq!(budgets[1].amount, dec("120.50"));

        let fetched = db.get_budget(id).unwrap().unwrap();
        assert_eq!(fetched.category_id, cat);
        assert!(db.get_budget(9999).unwrap().is_none());
    }

    #[test]
    fn test_set_budget_validation() {
        let db = Database::in_memory().unwrap();
        let cat = db.create_category(Some("u1"), "Food", None).unwrap();

        let negative = db.set_budget(cat, month("2024-01"), dec("-1"));
        assert!(matches!(negative, Err(Error::InvalidData(_))));

        let missing = db.set_budget(4242, month("2024-01"), dec("1"));
        assert!(matches!(missing, Err(Error::NotFound(_))));

        db.set_budget(cat, month("2024-01"), Decimal::ZERO).unwrap();
    }

    #[test]
    fn test_budget_month_unique_per_category() {
        let db = Database::in_memory().unwrap();
        let cat = db.create_category(Some("u1"), "Food", None).unwrap();
        db.set_budget(cat, month("2024-01"), dec("1")).unwrap();

        let conn = db.conn().unwrap();
        let result = conn.execute(
            "INSERT INTO budgets (category_id, month, amount, created_at) VALUES (?, '2024-01', '2', '2024-01-01 00:00:00')",
            params![cat],
        );
        assert!(result.is_err(), "second budget for the same month must be rejected");
    }

    #[test]
    fn test_transactions_crud() {
        let db = Database::in_memory().unwrap();
        let cat = db.create_category(Some("u1"), "Food", None).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();

        let id = db
            .create_transaction(Some(cat), date, "Grocer", dec("-42.10"))
            .unwrap();
        db.create_transaction(None, date, "Paycheck", dec("2000"))
            .unwrap();

        let for_cat = db.list_transactions_for_category(cat).unwrap();
        assert_eq!(for_cat.len(), 1);
        assert_eq!(for_cat[0].id, id);
        assert_eq!(for_cat[0].date, date);
        assert_eq!(for_cat[0].amount, dec("-42.10"));

        assert_eq!(db.list_transactions(10).unwrap().len(), 2);
        assert_eq!(db.get_stats().unwrap().total_transactions, 2);
    }

    #[test]
    fn test_run_in_transaction_commits() {
        let db = Database::in_memory().unwrap();
        let a = db.create_category(Some("u1"), "Food", None).unwrap();
        let b = db.create_category(Some("u1"), "food", None).unwrap();
        let budget = db.set_budget(b, month("2024-01"), dec("5")).unwrap();

        let adopted = db
            .run_in_transaction(|ops| ops.reassign_budget_category(budget, a))
            .unwrap();
        assert_eq!(adopted.category_id, a);
        assert_eq!(db.list_budgets(a).unwrap().len(), 1);
        assert!(db.list_budgets(b).unwrap().is_empty());
    }

    #[test]
    fn test_run_in_transaction_rolls_back() {
        let db = Database::in_memory().unwrap();
        let a = db.create_category(Some("u1"), "Food", None).unwrap();
        let budget = db.set_budget(a, month("2024-01"), dec("5")).unwrap();

        let result: Result<()> = db.run_in_transaction(|ops| {
            ops.update_budget_amount(budget, dec("500"))?;
            ops.delete_categories(&[a])?;
            Ok(())
        });
        // The FK from budgets to categories fails the delete
        assert!(matches!(result, Err(Error::Database(_))));

        let budgets = db.list_budgets(a).unwrap();
        assert_eq!(budgets[0].amount, dec("5"));
        assert!(db.get_category(a).unwrap().is_some());
    }

    #[test]
    fn test_reassign_budget_rejects_month_collision() {
        let db = Database::in_memory().unwrap();
        let a = db.create_category(Some("u1"), "Food", None).unwrap();
        let b = db.create_category(Some("u1"), "Food", None).unwrap();
        db.set_budget(a, month("2024-01"), dec("1")).unwrap();
        let other = db.set_budget(b, month("2024-01"), dec("2")).unwrap();

        let result = db.run_in_transaction(|ops| ops.reassign_budget_category(other, a));
        assert!(result.is_err());
        assert_eq!(db.list_budgets(b).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_ops_bulk_updates() {
        let db = Database::in_memory().unwrap();
        let a = db.create_category(Some("u1"), "Food", None).unwrap();
        let b = db.create_category(Some("u1"), "Food", None).unwrap();
        let c = db.create_category(Some("u1"), "Food", None).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        db.create_transaction(Some(b), date, "one", dec("-1")).unwrap();
        db.create_transaction(Some(c), date, "two", dec("-2")).unwrap();
        db.create_transaction(Some(a), date, "three", dec("-3")).unwrap();

        let (moved, deleted) = db
            .run_in_transaction(|ops| {
                let moved = ops.reassign_transactions_category(&[b, c], a)?;
                let deleted = ops.delete_categories(&[b, c])?;
                assert_eq!(ops.reassign_transactions_category(&[], a)?, 0);
                assert_eq!(ops.delete_categories(&[])?, 0);
                Ok((moved, deleted))
            })
            .unwrap();

        assert_eq!(moved, 2);
        assert_eq!(deleted, 2);
        assert_eq!(db.list_transactions_for_category(a).unwrap().len(), 3);
        assert_eq!(db.list_categories().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_ops_missing_budget() {
        let db = Database::in_memory().unwrap();
        let result = db.run_in_transaction(|ops| ops.delete_budget(12345));
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result = db.run_in_transaction(|ops| ops.update_budget_amount(12345, dec("1")));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();
        db.log_audit("tester", "first", None, None, None).unwrap();
        db.run_in_transaction(|ops| ops.record_audit("second", Some(7), Some("{}")))
            .unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "second");
        assert_eq!(entries[0].entity_type.as_deref(), Some("category"));
        assert_eq!(entries[0].entity_id, Some(7));
        assert_eq!(entries[1].actor, "tester");
    }

    #[test]
    fn test_parse_datetime_formats() {
        let plain = parse_datetime("2024-01-02 03:04:05").unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());

        let fractional = parse_datetime("2024-01-02 03:04:05.250000").unwrap();
        assert!(fractional > plain);

        let rfc = parse_datetime("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(rfc, plain);

        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_stored_timestamps_sort_chronologically() {
        let a = format_datetime(&at(0));
        let b = format_datetime(&at(1));
        assert!(a < b);
        assert_eq!(parse_datetime(&a).unwrap(), at(0));
    }
}

//! SQLite implementation of the dedupe data-access seam

use rusqlite::{params, params_from_iter, Connection};
use rust_decimal::Decimal;
use tracing::debug;

use super::audit::{insert_audit, SYSTEM_ACTOR};
use super::budgets::{query_budget, query_budgets};
use super::categories::query_categories;
use super::Database;
use crate::error::{Error, Result};
use crate::models::{Budget, Category};
use crate::store::{CategoryStore, MergeOps};

/// `MergeOps` bound to an open SQLite transaction
pub(crate) struct SqliteMergeOps<'a> {
    conn: &'a Connection,
}

/// Build `?, ?, ?` for an IN clause
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl MergeOps for SqliteMergeOps<'_> {
    fn list_budgets(&mut self, category_id: i64) -> Result<Vec<Budget>> {
        query_budgets(self.conn, category_id)
    }

    fn update_budget_amount(&mut self, budget_id: i64, amount: Decimal) -> Result<Budget> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::InvalidData(format!(
                "Budget amount cannot be negative: {}",
                amount
            )));
        }

        let changed = self.conn.execute(
            "UPDATE budgets SET amount = ? WHERE id = ?",
            params![amount.to_string(), budget_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Budget {}", budget_id)));
        }

        query_budget(self.conn, budget_id)
    }

    fn delete_budget(&mut self, budget_id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM budgets WHERE id = ?", params![budget_id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Budget {}", budget_id)));
        }
        Ok(())
    }

    fn reassign_budget_category(&mut self, budget_id: i64, category_id: i64) -> Result<Budget> {
        // UNIQUE(category_id, month) rejects a second row for the same month
        let changed = self.conn.execute(
            "UPDATE budgets SET category_id = ? WHERE id = ?",
            params![category_id, budget_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Budget {}", budget_id)));
        }

        query_budget(self.conn, budget_id)
    }

    fn reassign_transactions_category(
        &mut self,
        from_category_ids: &[i64],
        to_category_id: i64,
    ) -> Result<usize> {
        if from_category_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE transactions SET category_id = ? WHERE category_id IN ({})",
            placeholders(from_category_ids.len())
        );
        let values = std::iter::once(to_category_id).chain(from_category_ids.iter().copied());
        Ok(self.conn.execute(&sql, params_from_iter(values))?)
    }

    fn delete_categories(&mut self, category_ids: &[i64]) -> Result<usize> {
        if category_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM categories WHERE id IN ({})",
            placeholders(category_ids.len())
        );
        Ok(self.conn.execute(&sql, params_from_iter(category_ids.iter()))?)
    }

    fn record_audit(
        &mut self,
        action: &str,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<()> {
        insert_audit(
            self.conn,
            SYSTEM_ACTOR,
            action,
            Some("category"),
            entity_id,
            details,
        )?;
        Ok(())
    }
}

impl CategoryStore for Database {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        query_categories(&conn)
    }

    fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn MergeOps) -> Result<T>,
    {
        // The pooled connection returns to the pool when this scope ends
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let result = {
            let mut ops = SqliteMergeOps { conn: &tx };
            work(&mut ops)
        };

        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                // Dropping an uncommitted rusqlite transaction rolls it back
                debug!("Rolling back transaction: {}", e);
                drop(tx);
                Err(e)
            }
        }
    }
}

//! Budget operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{decimal_column, format_datetime, month_column, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, Month};

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        month: month_column(row, 2)?,
        amount: decimal_column(row, 3)?,
    })
}

pub(crate) fn query_budgets(conn: &Connection, category_id: i64) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, month, amount FROM budgets WHERE category_id = ? ORDER BY month, id",
    )?;

    let budgets = stmt
        .query_map(params![category_id], row_to_budget)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(budgets)
}

pub(crate) fn query_budget(conn: &Connection, id: i64) -> Result<Budget> {
    conn.query_row(
        "SELECT id, category_id, month, amount FROM budgets WHERE id = ?",
        params![id],
        row_to_budget,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))
}

impl Database {
    /// Set the budget for a category and month, replacing any existing amount
    pub fn set_budget(&self, category_id: i64, month: Month, amount: Decimal) -> Result<i64> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(Error::InvalidData(format!(
                "Budget amount cannot be negative: {}",
                amount
            )));
        }

        if self.get_category(category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }

        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            r#"
            INSERT INTO budgets (category_id, month, amount, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(category_id, month) DO UPDATE SET amount = excluded.amount
            RETURNING id
            "#,
            params![
                category_id,
                month.to_string(),
                amount.to_string(),
                format_datetime(&Utc::now())
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    /// List budgets for a category, ordered by month
    pub fn list_budgets(&self, category_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        query_budgets(&conn, category_id)
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        match query_budget(&conn, id) {
            Ok(budget) => Ok(Some(budget)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

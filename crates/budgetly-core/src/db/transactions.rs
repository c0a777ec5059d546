//! Transaction operations

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Row};
use rust_decimal::Decimal;

use super::{date_column, decimal_column, format_datetime, Database};
use crate::error::Result;
use crate::models::Transaction;

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        category_id: row.get(1)?,
        date: date_column(row, 2)?,
        description: row.get(3)?,
        amount: decimal_column(row, 4)?,
    })
}

impl Database {
    /// Record a transaction, optionally assigned to a category
    pub fn create_transaction(
        &self,
        category_id: Option<i64>,
        date: NaiveDate,
        description: &str,
        amount: Decimal,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (category_id, date, description, amount, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                category_id,
                date.to_string(),
                description,
                amount.to_string(),
                format_datetime(&Utc::now())
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List transactions assigned to a category, oldest first
    pub fn list_transactions_for_category(&self, category_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, category_id, date, description, amount
            FROM transactions
            WHERE category_id = ?
            ORDER BY date, id
            "#,
        )?;

        let transactions = stmt
            .query_map(params![category_id], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List the most recent transactions
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, category_id, date, description, amount
            FROM transactions
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![limit], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}

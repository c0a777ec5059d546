//! Category operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{datetime_column, format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Category;

const CATEGORY_COLUMNS: &str = "id, owner_id, name, color, created_at";

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: datetime_column(row, 4)?,
    })
}

/// All categories, oldest first
pub(crate) fn query_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM categories ORDER BY created_at, id",
        CATEGORY_COLUMNS
    ))?;

    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(categories)
}

impl Database {
    /// Create a category stamped with the current time
    pub fn create_category(
        &self,
        owner_id: Option<&str>,
        name: &str,
        color: Option<&str>,
    ) -> Result<i64> {
        self.create_category_at(owner_id, name, color, Utc::now())
    }

    /// Create a category with an explicit creation timestamp
    ///
    /// Used by imports and tests that need control over which duplicate is oldest.
    pub fn create_category_at(
        &self,
        owner_id: Option<&str>,
        name: &str,
        color: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(Error::InvalidData("Category name cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (owner_id, name, color, created_at) VALUES (?, ?, ?, ?)",
            params![owner_id, name, color, format_datetime(&created_at)],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;

        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                params![id],
                row_to_category,
            )
            .optional()?;

        Ok(category)
    }

    /// List all categories, oldest first
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        query_categories(&conn)
    }

    /// List categories belonging to one owner, oldest first
    pub fn list_categories_for_owner(&self, owner_id: &str) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories WHERE owner_id = ? ORDER BY created_at, id",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map(params![owner_id], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }
}

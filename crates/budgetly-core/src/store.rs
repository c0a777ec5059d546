//! Data-access seam for the category deduplication routine
//!
//! The dedupe code never talks to SQLite directly. It is handed a
//! [`CategoryStore`], lists categories through it, and performs every write
//! through the [`MergeOps`] handle passed into [`CategoryStore::run_in_transaction`].
//! `Database` implements this over SQLite; `MemoryStore` (test utilities)
//! implements it in memory.

use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Budget, Category};

/// Writes available to a merge, all scoped to one atomic unit
pub trait MergeOps {
    /// Budgets currently owned by a category, ordered by month
    fn list_budgets(&mut self, category_id: i64) -> Result<Vec<Budget>>;

    /// Replace a budget's amount, returning the updated row
    fn update_budget_amount(&mut self, budget_id: i64, amount: Decimal) -> Result<Budget>;

    fn delete_budget(&mut self, budget_id: i64) -> Result<()>;

    /// Point an existing budget row at another category, returning the updated row
    fn reassign_budget_category(&mut self, budget_id: i64, category_id: i64) -> Result<Budget>;

    /// Bulk re-point every transaction in `from_category_ids` to `to_category_id`.
    /// Returns the number of transactions moved.
    fn reassign_transactions_category(
        &mut self,
        from_category_ids: &[i64],
        to_category_id: i64,
    ) -> Result<usize>;

    /// Returns the number of categories deleted
    fn delete_categories(&mut self, category_ids: &[i64]) -> Result<usize>;

    /// Append an audit log entry inside the current unit
    fn record_audit(
        &mut self,
        action: &str,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<()>;
}

/// A store holding categories and their dependent records
pub trait CategoryStore {
    /// All categories for all owners, ordered by creation time ascending
    fn list_categories(&self) -> Result<Vec<Category>>;

    /// Run `work` atomically: commit when it returns `Ok`, roll back on `Err`.
    fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn MergeOps) -> Result<T>;
}

//! Test utilities for budgetly-core
//!
//! This module provides an in-memory [`CategoryStore`] with snapshot/restore
//! transactions and fault injection, so the dedupe routine can be exercised
//! without SQLite.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{Budget, Category, Month, Transaction};
use crate::store::{CategoryStore, MergeOps};

/// Timestamp `secs` seconds after 2024-01-01T00:00:00Z
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
}

/// An operation that should fail when reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    /// `list_categories` fails (store unreachable)
    ListCategories,
    /// `reassign_transactions_category` fails when targeting this survivor
    RepointInto(i64),
    /// Every `delete_categories` call fails
    DeleteCategories,
}

/// Audit row captured by the memory store
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryAuditEntry {
    pub action: String,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i64,
    categories: BTreeMap<i64, Category>,
    budgets: BTreeMap<i64, Budget>,
    transactions: BTreeMap<i64, Transaction>,
    audit: Vec<MemoryAuditEntry>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory category store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
    fail_point: RefCell<Option<FailPoint>>,
    writes: Cell<usize>,
    commits: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a failure; replaces any earlier one
    pub fn fail_on(&self, point: FailPoint) {
        *self.fail_point.borrow_mut() = Some(point);
    }

    pub fn clear_failure(&self) {
        *self.fail_point.borrow_mut() = None;
    }

    pub fn add_category(
        &self,
        owner_id: Option<&str>,
        name: &str,
        color: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.categories.insert(
            id,
            Category {
                id,
                owner_id: owner_id.map(str::to_string),
                name: name.to_string(),
                color: color.map(str::to_string),
                created_at,
            },
        );
        id
    }

    /// Add a budget; `month` is `YYYY-MM`, `amount` a decimal string
    pub fn add_budget(&self, category_id: i64, month: &str, amount: &str) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.budgets.insert(
            id,
            Budget {
                id,
                category_id,
                month: month.parse().unwrap(),
                amount: amount.parse().unwrap(),
            },
        );
        id
    }

    pub fn add_transaction(&self, category_id: Option<i64>, amount: &str) -> i64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.transactions.insert(
            id,
            Transaction {
                id,
                category_id,
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                description: format!("tx {}", id),
                amount: amount.parse().unwrap(),
            },
        );
        id
    }

    pub fn category(&self, id: i64) -> Option<Category> {
        self.state.borrow().categories.get(&id).cloned()
    }

    pub fn category_ids(&self) -> Vec<i64> {
        self.state.borrow().categories.keys().copied().collect()
    }

    /// Budgets for a category, ordered by month
    pub fn budgets_for(&self, category_id: i64) -> Vec<Budget> {
        let mut budgets: Vec<Budget> = self
            .state
            .borrow()
            .budgets
            .values()
            .filter(|b| b.category_id == category_id)
            .cloned()
            .collect();
        budgets.sort_by_key(|b| (b.month, b.id));
        budgets
    }

    /// Amount of a category's budget for `month`, if any
    pub fn budget_amount(&self, category_id: i64, month: &str) -> Option<Decimal> {
        let month: Month = month.parse().ok()?;
        self.budgets_for(category_id)
            .into_iter()
            .find(|b| b.month == month)
            .map(|b| b.amount)
    }

    pub fn transaction(&self, id: i64) -> Option<Transaction> {
        self.state.borrow().transactions.get(&id).cloned()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().transactions.values().cloned().collect()
    }

    pub fn audit_entries(&self) -> Vec<MemoryAuditEntry> {
        self.state.borrow().audit.clone()
    }

    /// Mutating calls made through `MergeOps`, including rolled-back ones
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Transactions that committed
    pub fn commit_count(&self) -> usize {
        self.commits.get()
    }
}

struct MemoryOps<'a> {
    state: &'a mut MemoryState,
    fail_point: Option<FailPoint>,
    writes: &'a Cell<usize>,
}

impl MemoryOps<'_> {
    fn write(&self) {
        self.writes.set(self.writes.get() + 1);
    }

    fn budget(&self, id: i64) -> Result<Budget> {
        self.state
            .budgets
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))
    }
}

impl MergeOps for MemoryOps<'_> {
    fn list_budgets(&mut self, category_id: i64) -> Result<Vec<Budget>> {
        let mut budgets: Vec<Budget> = self
            .state
            .budgets
            .values()
            .filter(|b| b.category_id == category_id)
            .cloned()
            .collect();
        budgets.sort_by_key(|b| (b.month, b.id));
        Ok(budgets)
    }

    fn update_budget_amount(&mut self, budget_id: i64, amount: Decimal) -> Result<Budget> {
        self.write();
        let budget = self
            .state
            .budgets
            .get_mut(&budget_id)
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget_id)))?;
        budget.amount = amount;
        Ok(budget.clone())
    }

    fn delete_budget(&mut self, budget_id: i64) -> Result<()> {
        self.write();
        self.state
            .budgets
            .remove(&budget_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget_id)))
    }

    fn reassign_budget_category(&mut self, budget_id: i64, category_id: i64) -> Result<Budget> {
        self.write();
        let month = self.budget(budget_id)?.month;

        // Mirror UNIQUE(category_id, month)
        let collides = self
            .state
            .budgets
            .values()
            .any(|b| b.id != budget_id && b.category_id == category_id && b.month == month);
        if collides {
            return Err(Error::Store(format!(
                "UNIQUE constraint failed: budgets.category_id, budgets.month ({}, {})",
                category_id, month
            )));
        }

        let budget = self
            .state
            .budgets
            .get_mut(&budget_id)
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget_id)))?;
        budget.category_id = category_id;
        Ok(budget.clone())
    }

    fn reassign_transactions_category(
        &mut self,
        from_category_ids: &[i64],
        to_category_id: i64,
    ) -> Result<usize> {
        self.write();
        if self.fail_point == Some(FailPoint::RepointInto(to_category_id)) {
            return Err(Error::Store("injected failure: repoint".into()));
        }

        let mut moved = 0;
        for tx in self.state.transactions.values_mut() {
            if tx.category_id.is_some_and(|id| from_category_ids.contains(&id)) {
                tx.category_id = Some(to_category_id);
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn delete_categories(&mut self, category_ids: &[i64]) -> Result<usize> {
        self.write();
        if self.fail_point == Some(FailPoint::DeleteCategories) {
            return Err(Error::Store("injected failure: delete categories".into()));
        }

        // Mirror the budgets -> categories foreign key
        if let Some(orphan) = self
            .state
            .budgets
            .values()
            .find(|b| category_ids.contains(&b.category_id))
        {
            return Err(Error::Store(format!(
                "FOREIGN KEY constraint failed: budget {} still references category {}",
                orphan.id, orphan.category_id
            )));
        }

        let before = self.state.categories.len();
        self.state
            .categories
            .retain(|id, _| !category_ids.contains(id));
        Ok(before - self.state.categories.len())
    }

    fn record_audit(
        &mut self,
        action: &str,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<()> {
        self.write();
        self.state.audit.push(MemoryAuditEntry {
            action: action.to_string(),
            entity_id,
            details: details.map(str::to_string),
        });
        Ok(())
    }
}

impl CategoryStore for MemoryStore {
    fn list_categories(&self) -> Result<Vec<Category>> {
        if *self.fail_point.borrow() == Some(FailPoint::ListCategories) {
            return Err(Error::Store("injected failure: store unreachable".into()));
        }

        let mut categories: Vec<Category> =
            self.state.borrow().categories.values().cloned().collect();
        categories.sort_by_key(|c| (c.created_at, c.id));
        Ok(categories)
    }

    fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn MergeOps) -> Result<T>,
    {
        // Work on a copy; only a successful unit replaces the live state
        let mut working = self.state.borrow().clone();
        let result = {
            let mut ops = MemoryOps {
                state: &mut working,
                fail_point: self.fail_point.borrow().clone(),
                writes: &self.writes,
            };
            work(&mut ops)
        };

        if result.is_ok() {
            *self.state.borrow_mut() = working;
            self.commits.set(self.commits.get() + 1);
        }
        result
    }
}

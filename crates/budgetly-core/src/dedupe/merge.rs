//! Fold one duplicate group into its survivor
//!
//! A merge is a fixed sequence of [`MergeStep`]s run against a [`MergeOps`]
//! handle. The caller wraps the whole sequence in one store transaction, so
//! a failure at any step leaves the group untouched.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::group::DuplicateGroup;
use crate::error::{Error, Result};
use crate::models::{Budget, Month};
use crate::store::MergeOps;

/// Audit action recorded for each merged group
pub const MERGE_AUDIT_ACTION: &str = "merge_categories";

/// One stage of a group merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// Fold or adopt every removal budget into the survivor
    FoldBudgets,
    /// Point every removal transaction at the survivor
    RepointTransactions,
    /// Delete the removal categories
    DeleteRemovals,
    /// Record the merge in the audit log
    RecordAudit,
}

/// Steps in execution order
pub const MERGE_STEPS: [MergeStep; 4] = [
    MergeStep::FoldBudgets,
    MergeStep::RepointTransactions,
    MergeStep::DeleteRemovals,
    MergeStep::RecordAudit,
];

/// Result of merging one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeOutcome {
    pub survivor: i64,
    pub owner_id: String,
    pub name: String,
    pub removed: Vec<i64>,
    /// Removal budgets added into an existing survivor row and deleted
    pub budgets_folded: usize,
    /// Removal budgets re-pointed to the survivor
    pub budgets_adopted: usize,
    pub transactions_repointed: usize,
}

impl MergeOutcome {
    fn for_group(group: &DuplicateGroup) -> Self {
        Self {
            survivor: group.survivor,
            owner_id: group.owner_id().to_string(),
            name: group.name.clone(),
            removed: Vec::new(),
            budgets_folded: 0,
            budgets_adopted: 0,
            transactions_repointed: 0,
        }
    }
}

/// The survivor's budgets keyed by month, kept current as removals fold in
struct BudgetFold {
    survivor: i64,
    by_month: BTreeMap<Month, Budget>,
}

impl BudgetFold {
    fn load(ops: &mut dyn MergeOps, survivor: i64) -> Result<Self> {
        let mut by_month = BTreeMap::new();
        for budget in ops.list_budgets(survivor)? {
            let month = budget.month;
            if let Some(existing) = by_month.insert(month, budget) {
                return Err(Error::MergeConflict(format!(
                    "category {} already has two budgets for {} (ids {} and {})",
                    survivor, month, existing.id, by_month[&month].id
                )));
            }
        }
        Ok(Self { survivor, by_month })
    }

    fn absorb(
        &mut self,
        ops: &mut dyn MergeOps,
        budget: Budget,
        outcome: &mut MergeOutcome,
    ) -> Result<()> {
        let month = budget.month;

        match self.by_month.get(&month) {
            Some(target) => {
                if target.id == budget.id {
                    return Err(Error::MergeConflict(format!(
                        "budget {} for {} is listed under both category {} and the survivor {}",
                        budget.id, month, budget.category_id, self.survivor
                    )));
                }

                let total = target.amount.checked_add(budget.amount).ok_or_else(|| {
                    Error::MergeConflict(format!(
                        "budget total for {} overflows ({} + {})",
                        month, target.amount, budget.amount
                    ))
                })?;

                debug!(
                    "Folding budget {} ({}) into {} for {}: {} -> {}",
                    budget.id, budget.amount, target.id, month, target.amount, total
                );
                let target_id = target.id;
                let updated = ops.update_budget_amount(target_id, total)?;
                ops.delete_budget(budget.id)?;

                if updated.id != target_id || updated.month != month || updated.amount != total {
                    return Err(Error::MergeConflict(format!(
                        "store returned an unexpected row after folding into budget {}",
                        target_id
                    )));
                }
                self.by_month.insert(month, updated);
                outcome.budgets_folded += 1;
            }
            None => {
                debug!(
                    "Adopting budget {} for {} into category {}",
                    budget.id, month, self.survivor
                );
                let adopted = ops.reassign_budget_category(budget.id, self.survivor)?;

                if adopted.category_id != self.survivor || adopted.month != month {
                    return Err(Error::MergeConflict(format!(
                        "budget {} was not re-pointed to category {} for {}",
                        budget.id, self.survivor, month
                    )));
                }
                self.by_month.insert(month, adopted);
                outcome.budgets_adopted += 1;
            }
        }

        Ok(())
    }
}

/// Merge every removal of `group` into its survivor
///
/// Must be run inside a store transaction; this function does no rollback
/// bookkeeping of its own.
pub fn merge_group(ops: &mut dyn MergeOps, group: &DuplicateGroup) -> Result<MergeOutcome> {
    let mut outcome = MergeOutcome::for_group(group);

    for step in MERGE_STEPS {
        match step {
            MergeStep::FoldBudgets => {
                let mut fold = BudgetFold::load(ops, group.survivor)?;
                // Creation order: a later removal folds into a row adopted from an earlier one
                for &removal in &group.removals {
                    for budget in ops.list_budgets(removal)? {
                        fold.absorb(ops, budget, &mut outcome)?;
                    }
                }
            }
            MergeStep::RepointTransactions => {
                outcome.transactions_repointed =
                    ops.reassign_transactions_category(&group.removals, group.survivor)?;
            }
            MergeStep::DeleteRemovals => {
                let deleted = ops.delete_categories(&group.removals)?;
                if deleted != group.removals.len() {
                    return Err(Error::MergeConflict(format!(
                        "expected to delete {} duplicate categories of {}, deleted {}",
                        group.removals.len(),
                        group.survivor,
                        deleted
                    )));
                }
                outcome.removed = group.removals.clone();
            }
            MergeStep::RecordAudit => {
                let details = serde_json::json!({
                    "owner_id": outcome.owner_id,
                    "name": outcome.name,
                    "removed": outcome.removed,
                    "budgets_folded": outcome.budgets_folded,
                    "budgets_adopted": outcome.budgets_adopted,
                    "transactions_repointed": outcome.transactions_repointed,
                });
                ops.record_audit(
                    MERGE_AUDIT_ACTION,
                    Some(group.survivor),
                    Some(&details.to_string()),
                )?;
            }
        }
    }

    Ok(outcome)
}

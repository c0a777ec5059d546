//! Category deduplication
//!
//! Categories that share an owner, a name (trimmed, case-insensitive) and a
//! color (case-insensitive) are duplicates. For each duplicate group the
//! oldest category survives; every other member's budgets and transactions
//! move onto it and the member is deleted. Each group is merged in its own
//! store transaction, so a failure only affects that group.

mod group;
mod merge;

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::store::CategoryStore;

pub use group::{find_duplicate_groups, DuplicateGroup, IdentityKey};
pub use merge::{merge_group, MergeOutcome, MergeStep, MERGE_AUDIT_ACTION, MERGE_STEPS};

/// A group whose merge was rolled back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFailure {
    pub survivor: i64,
    pub owner_id: String,
    pub name: String,
    pub removals: Vec<i64>,
    pub error: String,
}

/// Summary of one deduplication run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupeReport {
    pub groups_found: usize,
    pub merged: Vec<MergeOutcome>,
    pub failed: Vec<GroupFailure>,
}

impl DedupeReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Total categories deleted across merged groups
    pub fn removed_total(&self) -> usize {
        self.merged.iter().map(|m| m.removed.len()).sum()
    }
}

fn owner_label(owner_id: &str) -> &str {
    if owner_id.is_empty() {
        "(no owner)"
    } else {
        owner_id
    }
}

impl fmt::Display for DedupeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups_found == 0 {
            return writeln!(f, "No duplicate categories found.");
        }

        for m in &self.merged {
            writeln!(
                f,
                "Merged {} duplicate(s) into category {} ('{}', owner {})",
                m.removed.len(),
                m.survivor,
                m.name,
                owner_label(&m.owner_id)
            )?;
        }
        for g in &self.failed {
            writeln!(
                f,
                "Failed to merge {} duplicate(s) into category {} ('{}', owner {}): {}",
                g.removals.len(),
                g.survivor,
                g.name,
                owner_label(&g.owner_id),
                g.error
            )?;
        }
        Ok(())
    }
}

/// Runs deduplication against an injected store
pub struct Deduplicator<'a, S: CategoryStore> {
    store: &'a S,
}

impl<'a, S: CategoryStore> Deduplicator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Find duplicate groups without writing anything
    pub fn plan(&self) -> Result<Vec<DuplicateGroup>> {
        let categories = self.store.list_categories()?;
        let groups = find_duplicate_groups(&categories);
        info!(
            "Scanned {} categories, found {} duplicate groups",
            categories.len(),
            groups.len()
        );
        Ok(groups)
    }

    /// Merge every duplicate group
    ///
    /// Failing to list categories aborts the run. A group that fails to merge
    /// is rolled back, recorded in the report, and the run moves on.
    pub fn run(&self) -> Result<DedupeReport> {
        let groups = self.plan()?;
        let mut report = DedupeReport {
            groups_found: groups.len(),
            ..Default::default()
        };

        if groups.is_empty() {
            info!("No duplicate categories found");
            return Ok(report);
        }

        for group in &groups {
            match self.store.run_in_transaction(|ops| merge_group(ops, group)) {
                Ok(outcome) => {
                    info!(
                        "Merged {} duplicate(s) into category {} for owner '{}' ({})",
                        outcome.removed.len(),
                        outcome.survivor,
                        outcome.owner_id,
                        outcome.name
                    );
                    report.merged.push(outcome);
                }
                Err(e) => {
                    error!(
                        "Failed to merge duplicates of category {} for owner '{}' ({}): {}",
                        group.survivor,
                        group.owner_id(),
                        group.name,
                        e
                    );
                    report.failed.push(GroupFailure {
                        survivor: group.survivor,
                        owner_id: group.owner_id().to_string(),
                        name: group.name.clone(),
                        removals: group.removals.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

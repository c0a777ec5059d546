//! Budgetly Core Library
//!
//! Shared functionality for the Budgetly maintenance tools:
//! - Database access and migrations (SQLite with optional SQLCipher encryption)
//! - Data-access seam (`CategoryStore` / `MergeOps`) for maintenance routines
//! - Category deduplication that merges budgets and transactions into one survivor

pub mod db;
pub mod dedupe;
pub mod error;
pub mod models;
pub mod store;

/// Test utilities including an in-memory category store
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use db::{AuditEntry, Database};
pub use dedupe::{DedupeReport, Deduplicator, DuplicateGroup, GroupFailure, MergeOutcome};
pub use error::{Error, Result};
pub use store::{CategoryStore, MergeOps};

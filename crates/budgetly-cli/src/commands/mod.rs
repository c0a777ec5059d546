//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `status` - Status command
//! - `categories` - Category commands (list, add)
//! - `budgets` - Budget commands (list, set)
//! - `transactions` - Transaction commands (list, add)
//! - `dedupe` - Duplicate category merge

pub mod budgets;
pub mod categories;
pub mod core;
pub mod dedupe;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use categories::*;
pub use core::*;
pub use dedupe::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

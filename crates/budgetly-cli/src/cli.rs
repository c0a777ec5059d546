//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Budgetly - budgeting data maintenance
#[derive(Parser)]
#[command(name = "budgetly")]
#[command(about = "Maintenance tools for the Budgetly budgeting database", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "budgetly.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BUDGETLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, row counts)
    Status,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage monthly budgets
    Budgets {
        #[command(subcommand)]
        action: BudgetsAction,
    },

    /// Manage transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Merge duplicate categories (same owner, name and color)
    ///
    /// The oldest category in each duplicate group survives. Budgets for the
    /// same month are summed, transactions are moved, and the duplicates are
    /// deleted. Each group is merged in its own database transaction.
    Dedupe {
        /// Show the groups that would be merged without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories (oldest first)
    List {
        /// Only show categories for this owner
        #[arg(long)]
        owner: Option<String>,
    },

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Owning user id
        #[arg(long)]
        owner: Option<String>,

        /// Display color (e.g., "#10b981")
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets for a category
    List {
        /// Category ID
        category_id: i64,
    },

    /// Set the budget for a category and month
    Set {
        /// Category ID
        category_id: i64,

        /// Month (YYYY-MM)
        month: String,

        /// Amount (non-negative decimal)
        amount: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only show transactions in this category
        #[arg(long)]
        category: Option<i64>,
    },

    /// Record a transaction
    Add {
        /// Description
        description: String,

        /// Signed amount (negative = expense)
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Category ID
        #[arg(long)]
        category: Option<i64>,
    },
}

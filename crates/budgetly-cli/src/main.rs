//! Budgetly CLI - budgeting data maintenance
//!
//! Usage:
//!   budgetly init                 Initialize database
//!   budgetly categories           List categories
//!   budgetly dedupe --dry-run     Preview duplicate category merges
//!   budgetly dedupe --yes         Merge duplicate categories

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging on stderr so stdout stays parseable with --json
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_categories_list(&db, None),
                Some(CategoriesAction::List { owner }) => {
                    commands::cmd_categories_list(&db, owner.as_deref())
                }
                Some(CategoriesAction::Add { name, owner, color }) => {
                    commands::cmd_categories_add(&db, &name, owner.as_deref(), color.as_deref())
                }
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                BudgetsAction::List { category_id } => commands::cmd_budgets_list(&db, category_id),
                BudgetsAction::Set {
                    category_id,
                    month,
                    amount,
                } => commands::cmd_budgets_set(&db, category_id, &month, &amount),
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20, None),
                Some(TransactionsAction::List { limit, category }) => {
                    commands::cmd_transactions_list(&db, limit, category)
                }
                Some(TransactionsAction::Add {
                    description,
                    amount,
                    date,
                    category,
                }) => commands::cmd_transactions_add(
                    &db,
                    &description,
                    &amount,
                    date.as_deref(),
                    category,
                ),
            }
        }
        Commands::Dedupe { dry_run, json, yes } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_dedupe(&db, dry_run, json, yes)
        }
    }
}

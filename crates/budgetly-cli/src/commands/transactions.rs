//! Transaction command implementations

use anyhow::{Context, Result};
use budgetly_core::db::Database;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64, category: Option<i64>) -> Result<()> {
    let transactions = match category {
        Some(category_id) => db.list_transactions_for_category(category_id)?,
        None => db.list_transactions(limit)?,
    };

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  budgetly transactions add \"Groceries\" -42.10 --category <id>");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.amount.is_sign_negative() {
            format!("\x1b[31m${:.2}\x1b[0m", tx.amount.abs()) // Red for expenses
        } else {
            format!("\x1b[32m+${:.2}\x1b[0m", tx.amount) // Green for income
        };
        let category = tx
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {} │ {:>10} │ {:>5} │ {}",
            tx.date,
            amount_str,
            category,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(
    db: &Database,
    description: &str,
    amount: &str,
    date: Option<&str>,
    category: Option<i64>,
) -> Result<()> {
    let amount: Decimal = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount '{}'", amount))?;
    let date = match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", d))?,
        None => Local::now().date_naive(),
    };

    if let Some(category_id) = category {
        db.get_category(category_id)?
            .with_context(|| format!("Category {} not found", category_id))?;
    }

    let id = db.create_transaction(category, date, description, amount)?;
    println!("✅ Recorded transaction {} ({} on {})", id, amount, date);
    Ok(())
}

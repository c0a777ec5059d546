//! Budget command implementations

use anyhow::{Context, Result};
use budgetly_core::db::Database;
use budgetly_core::models::Month;
use rust_decimal::Decimal;

pub fn cmd_budgets_list(db: &Database, category_id: i64) -> Result<()> {
    let category = db
        .get_category(category_id)?
        .with_context(|| format!("Category {} not found", category_id))?;
    let budgets = db.list_budgets(category_id)?;

    if budgets.is_empty() {
        println!("No budgets for '{}'.", category.name);
        return Ok(());
    }

    println!();
    println!("💰 Budgets for '{}'", category.name);
    println!("   ─────────────────────────────");

    let mut total = Decimal::ZERO;
    for budget in budgets {
        println!("   {} │ {:>12}", budget.month, budget.amount.round_dp(2));
        total += budget.amount;
    }
    println!("   ─────────────────────────────");
    println!("   Total   │ {:>12}", total.round_dp(2));

    Ok(())
}

pub fn cmd_budgets_set(db: &Database, category_id: i64, month: &str, amount: &str) -> Result<()> {
    let month: Month = month.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount '{}'", amount))?;

    db.set_budget(category_id, month, amount)
        .context("Failed to set budget")?;

    println!(
        "✅ Budget for category {} in {} set to {}",
        category_id, month, amount
    );
    Ok(())
}

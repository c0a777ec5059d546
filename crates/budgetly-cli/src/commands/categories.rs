//! Category command implementations

use anyhow::{Context, Result};
use budgetly_core::db::Database;

use super::truncate;

pub fn cmd_categories_list(db: &Database, owner: Option<&str>) -> Result<()> {
    let categories = match owner {
        Some(owner) => db.list_categories_for_owner(owner)?,
        None => db.list_categories()?,
    };

    if categories.is_empty() {
        println!("No categories found. Add one with:");
        println!("  budgetly categories add Groceries --owner <user>");
        return Ok(());
    }

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");

    for category in categories {
        println!(
            "   {:>5} │ {:<24} │ {:<9} │ {:<12} │ {}",
            category.id,
            truncate(&category.name, 24),
            category.color.as_deref().unwrap_or("-"),
            truncate(category.owner_id.as_deref().unwrap_or("(none)"), 12),
            category.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    name: &str,
    owner: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    let id = db
        .create_category(owner, name, color)
        .context("Failed to create category")?;

    println!("✅ Created category '{}' (ID: {})", name, id);
    Ok(())
}

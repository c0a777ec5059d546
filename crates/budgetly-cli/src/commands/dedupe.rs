//! Dedupe command - merge duplicate categories
//!
//! Scans every category, groups duplicates by owner + normalized name and
//! color, and merges each group into its oldest member.

use anyhow::{bail, Result};
use std::io::{self, Write};

use budgetly_core::dedupe::{DedupeReport, Deduplicator, DuplicateGroup};
use budgetly_core::Database;

fn print_plan(groups: &[DuplicateGroup]) {
    println!();
    println!("🔍 Duplicate categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for group in groups {
        let owner = if group.owner_id().is_empty() {
            "(no owner)"
        } else {
            group.owner_id()
        };
        let removals: Vec<String> = group.removals.iter().map(|id| id.to_string()).collect();
        println!(
            "   '{}' (owner {}): keep {}, merge {}",
            group.name,
            owner,
            group.survivor,
            removals.join(", ")
        );
    }
    println!();
}

/// JSON for `--dry-run --json`: always an array of groups
pub fn plan_json(groups: &[DuplicateGroup]) -> Result<String> {
    Ok(serde_json::to_string_pretty(groups)?)
}

/// JSON for `--json`: always a report object, even when nothing was merged
pub fn report_json(report: &DedupeReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn cmd_dedupe(db: &Database, dry_run: bool, json: bool, yes: bool) -> Result<()> {
    let deduplicator = Deduplicator::new(db);

    let groups = deduplicator.plan()?;
    if groups.is_empty() {
        if json && dry_run {
            println!("{}", plan_json(&groups)?);
        } else if json {
            println!("{}", report_json(&DedupeReport::default())?);
        } else {
            println!("No duplicate categories found.");
        }
        return Ok(());
    }

    if dry_run {
        if json {
            println!("{}", plan_json(&groups)?);
        } else {
            print_plan(&groups);
            println!("Dry run: {} group(s) would be merged.", groups.len());
        }
        return Ok(());
    }

    // The prompt would share stdout with the JSON document
    if json && !yes {
        bail!("--json needs --yes or --dry-run");
    }

    // Confirm unless --yes
    if !yes {
        print_plan(&groups);
        print!("Merge {} group(s)? [y/N] ", groups.len());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    // Groups are re-scanned so the merge acts on current data
    let report = deduplicator.run()?;

    if json {
        println!("{}", report_json(&report)?);
    } else {
        print!("{}", report);
        if !report.has_failures() {
            println!(
                "✅ Removed {} duplicate categories in {} group(s).",
                report.removed_total(),
                report.merged.len()
            );
        }
    }

    if report.has_failures() {
        bail!(
            "{} of {} duplicate group(s) failed to merge; re-run to retry",
            report.failed.len(),
            report.groups_found
        );
    }

    Ok(())
}

//! Partition categories into duplicate groups

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Category;

/// Normalized identity of a category
///
/// Two categories are duplicates iff their keys are equal. A missing owner
/// normalizes to the empty string, so owner-less categories can still group
/// with each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    pub owner_id: String,
    pub name: String,
    pub color: String,
}

impl IdentityKey {
    pub fn of(category: &Category) -> Self {
        Self {
            owner_id: category.owner_id.clone().unwrap_or_default(),
            name: category.name.trim().to_lowercase(),
            color: category.color.as_deref().unwrap_or("").to_lowercase(),
        }
    }
}

/// Categories sharing one identity key, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub key: IdentityKey,
    /// Display name of the survivor
    pub name: String,
    /// Earliest-created member; keeps its id and absorbs the rest
    pub survivor: i64,
    pub survivor_created_at: DateTime<Utc>,
    /// Remaining members in creation order
    pub removals: Vec<i64>,
}

impl DuplicateGroup {
    pub fn owner_id(&self) -> &str {
        &self.key.owner_id
    }

    /// Survivor followed by removals
    pub fn member_ids(&self) -> Vec<i64> {
        std::iter::once(self.survivor)
            .chain(self.removals.iter().copied())
            .collect()
    }
}

/// Find every identity key shared by two or more categories
///
/// Members are ordered by creation time, ties broken by id. Groups come back
/// ordered by their survivor's creation time. Pure: no store access.
pub fn find_duplicate_groups(categories: &[Category]) -> Vec<DuplicateGroup> {
    let mut members: HashMap<IdentityKey, Vec<&Category>> = HashMap::new();
    for category in categories {
        members
            .entry(IdentityKey::of(category))
            .or_default()
            .push(category);
    }

    let mut groups: Vec<DuplicateGroup> = members
        .into_iter()
        .filter(|(_, list)| list.len() > 1)
        .map(|(key, mut list)| {
            list.sort_by_key(|c| (c.created_at, c.id));
            let survivor = list[0];
            DuplicateGroup {
                key,
                name: survivor.name.clone(),
                survivor: survivor.id,
                survivor_created_at: survivor.created_at,
                removals: list[1..].iter().map(|c| c.id).collect(),
            }
        })
        .collect();

    groups.sort_by_key(|g| (g.survivor_created_at, g.survivor));
    groups
}

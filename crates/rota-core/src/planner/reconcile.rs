//! Merging entry records into resource rows.
//!
//! Reconciliation is pure: it takes rows and entries and hands back new
//! rows. Callers decide whether the result replaces the whole store or is
//! spliced into it.

use std::collections::HashMap;

use crate::models::{EntryRecord, ObjectId, ResourceRow};

/// Merges `entries` into `rows` and returns only the rows that received at
/// least one entry.
///
/// Entries without a valid date or without an owner are skipped. When two
/// entries of one resource fall on the same day, the one that comes later in
/// `entries` wins.
pub fn reconcile(rows: &[ResourceRow], entries: &[EntryRecord]) -> Vec<ResourceRow> {
    let by_owner = group_by_owner(entries);

    rows.iter()
        .filter_map(|row| {
            let matching = by_owner.get(&row.identity)?;
            let mut updated = row.clone();
            for entry in matching {
                if let Some(key) = entry.date_key() {
                    updated.set_cell(key, entry.identity.clone(), entry.display_content.clone());
                }
            }
            Some(updated)
        })
        .collect()
}

/// Like [`reconcile`], but returns every row in its original position with
/// the changed ones replaced.
pub fn apply(rows: Vec<ResourceRow>, entries: &[EntryRecord]) -> Vec<ResourceRow> {
    let mut changed: HashMap<ObjectId, ResourceRow> = reconcile(&rows, entries)
        .into_iter()
        .map(|row| (row.identity.clone(), row))
        .collect();

    rows.into_iter()
        .map(|row| changed.remove(&row.identity).unwrap_or(row))
        .collect()
}

fn group_by_owner(entries: &[EntryRecord]) -> HashMap<&ObjectId, Vec<&EntryRecord>> {
    let mut groups: HashMap<&ObjectId, Vec<&EntryRecord>> = HashMap::new();
    for entry in entries {
        let Some(owner) = entry.owner.as_ref() else {
            log::debug!("reconcile: entry {} has no owner", entry.identity);
            continue;
        };
        if entry.occurs_on.is_none() {
            log::debug!("reconcile: entry {} has no valid date", entry.identity);
            continue;
        }
        groups.entry(owner).or_default().push(entry);
    }
    groups
}

//! Resource rows of the planner grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ObjectId;
use crate::calendar::DateKey;

/// One resource and its cells.
///
/// Rows are value records: reconciliation produces new rows instead of
/// mutating rows held by the [`crate::planner::RowStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRow {
    /// Identity of the resource object
    pub identity: ObjectId,

    /// Rendered resource title
    pub label: String,

    /// Entry identity per day; at most one entry per day
    #[serde(default)]
    pub entries_by_date_key: BTreeMap<DateKey, ObjectId>,

    /// Rendered entry content per day, same keys as `entries_by_date_key`
    #[serde(default)]
    pub display_fields_by_date_key: BTreeMap<DateKey, String>,
}

impl ResourceRow {
    /// Creates a row without any cells.
    pub fn new(identity: ObjectId, label: impl Into<String>) -> Self {
        Self {
            identity,
            label: label.into(),
            entries_by_date_key: BTreeMap::new(),
            display_fields_by_date_key: BTreeMap::new(),
        }
    }

    /// Writes one cell, replacing whatever occupied that day.
    pub fn set_cell(&mut self, key: DateKey, entry: ObjectId, content: impl Into<String>) {
        self.display_fields_by_date_key
            .insert(key.clone(), content.into());
        self.entries_by_date_key.insert(key, entry);
    }

    /// Entry scheduled on the given day.
    pub fn entry_at(&self, key: &DateKey) -> Option<&ObjectId> {
        self.entries_by_date_key.get(key)
    }

    /// Rendered content of the given day.
    pub fn content_at(&self, key: &DateKey) -> Option<&str> {
        self.display_fields_by_date_key.get(key).map(String::as_str)
    }

    /// Identities of all entries currently placed on this row.
    pub fn entry_identities(&self) -> impl Iterator<Item = &ObjectId> {
        self.entries_by_date_key.values()
    }

    /// Day on which the given entry is placed, if any.
    pub fn date_key_of(&self, entry: &ObjectId) -> Option<&DateKey> {
        self.entries_by_date_key
            .iter()
            .find_map(|(key, id)| (id == entry).then_some(key))
    }
}

//! Ordered storage of resource rows.

use crate::models::{ObjectId, ResourceRow};

/// The planner's rows in arrival order of the last full fetch.
///
/// Incremental updates never re-sort the store and never insert rows; only
/// [`RowStore::replace_all`] changes which resources are present, apart from
/// removals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStore {
    rows: Vec<ResourceRow>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current rows in favour of a fresh full load.
    pub fn replace_all(&mut self, rows: Vec<ResourceRow>) {
        self.rows = rows;
    }

    /// Replaces rows in place by identity.
    ///
    /// Updates for identities that are not in the store are ignored, so a
    /// late result cannot bring back a removed resource. Returns the number
    /// of rows replaced.
    pub fn splice_replace(&mut self, updated: Vec<ResourceRow>) -> usize {
        let mut replaced = 0;
        for row in updated {
            match self.rows.iter().position(|r| r.identity == row.identity) {
                Some(index) => {
                    self.rows[index] = row;
                    replaced += 1;
                }
                None => log::debug!("splice_replace: dropping update for {}", row.identity),
            }
        }
        replaced
    }

    /// Drops the row of a resource that no longer exists.
    pub fn remove_by_identity(&mut self, identity: &ObjectId) -> Option<ResourceRow> {
        let index = self.rows.iter().position(|r| &r.identity == identity)?;
        Some(self.rows.remove(index))
    }

    pub fn rows(&self) -> &[ResourceRow] {
        &self.rows
    }

    pub fn get(&self, identity: &ObjectId) -> Option<&ResourceRow> {
        self.rows.iter().find(|r| &r.identity == identity)
    }

    pub fn contains(&self, identity: &ObjectId) -> bool {
        self.get(identity).is_some()
    }

    /// Rows currently holding the given entry. Normally at most one, but
    /// a row refreshed ahead of the entry's own notice may hold it too.
    pub fn rows_holding_entry<'a>(
        &'a self,
        entry: &'a ObjectId,
    ) -> impl Iterator<Item = &'a ResourceRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.date_key_of(entry).is_some())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

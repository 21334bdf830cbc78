//! Resource, entry and view queries.

use jiff::{civil::Date, Timestamp};
use rota_core::error::{FetchResultExt, Result};
use rusqlite::{params, OptionalExtension, Row};

use super::{StoredEntry, StoredResource, StoredView};

const INSERT_RESOURCE_SQL: &str = "INSERT INTO resources (name, created_at) VALUES (?1, ?2)";
const SELECT_RESOURCES_SQL: &str = "SELECT id, name FROM resources ORDER BY id";
const SELECT_RESOURCE_SQL: &str = "SELECT id, name FROM resources WHERE id = ?1";
const DELETE_RESOURCE_SQL: &str = "DELETE FROM resources WHERE id = ?1";

const INSERT_ENTRY_SQL: &str =
    "INSERT INTO entries (resource_id, date, title, created_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_ENTRY_SQL: &str = "SELECT id, resource_id, date, title FROM entries WHERE id = ?1";
// Rows without a date are included so the planner can drop them itself
const SELECT_ENTRIES_IN_RANGE_SQL: &str = "SELECT id, resource_id, date, title FROM entries \
     WHERE date IS NULL OR (date >= ?1 AND date <= ?2) ORDER BY id";
const UPDATE_ENTRY_RESOURCE_SQL: &str = "UPDATE entries SET resource_id = ?1 WHERE id = ?2";
const DELETE_ENTRY_SQL: &str = "DELETE FROM entries WHERE id = ?1";

const SELECT_VIEW_SQL: &str = "SELECT year, month FROM view WHERE id = 1";
const UPSERT_VIEW_SQL: &str = "INSERT INTO view (id, year, month) VALUES (1, ?1, ?2) \
     ON CONFLICT(id) DO UPDATE SET year = excluded.year, month = excluded.month";

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<StoredResource> {
    Ok(StoredResource {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get(0)?,
        resource_id: row.get(1)?,
        date: row.get(2)?,
        title: row.get(3)?,
    })
}

impl super::Database {
    /// Creates a resource.
    pub fn insert_resource(&mut self, name: &str) -> Result<StoredResource> {
        let now = Timestamp::now().to_string();
        self.connection
            .execute(INSERT_RESOURCE_SQL, params![name, now])
            .fetch_context("Failed to insert resource")?;

        Ok(StoredResource {
            id: self.connection.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Lists resources in creation order.
    pub fn list_resources(&self) -> Result<Vec<StoredResource>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_RESOURCES_SQL)
            .fetch_context("Failed to prepare query")?;
        let resources = stmt
            .query_map([], resource_from_row)
            .fetch_context("Failed to query resources")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .fetch_context("Failed to read resources")?;
        Ok(resources)
    }

    pub fn get_resource(&self, id: i64) -> Result<Option<StoredResource>> {
        self.connection
            .query_row(SELECT_RESOURCE_SQL, params![id], resource_from_row)
            .optional()
            .fetch_context("Failed to get resource")
    }

    /// Deletes a resource and its entries. Returns whether it existed.
    pub fn delete_resource(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_RESOURCE_SQL, params![id])
            .fetch_context("Failed to delete resource")?;
        Ok(deleted > 0)
    }

    /// Creates an entry for a resource on a day.
    pub fn insert_entry(&mut self, resource_id: i64, date: Date, title: &str) -> Result<StoredEntry> {
        let now = Timestamp::now().to_string();
        let date = date.to_string();
        self.connection
            .execute(INSERT_ENTRY_SQL, params![resource_id, date, title, now])
            .fetch_context("Failed to insert entry")?;

        Ok(StoredEntry {
            id: self.connection.last_insert_rowid(),
            resource_id: Some(resource_id),
            date: Some(date),
            title: title.to_string(),
        })
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<StoredEntry>> {
        self.connection
            .query_row(SELECT_ENTRY_SQL, params![id], entry_from_row)
            .optional()
            .fetch_context("Failed to get entry")
    }

    /// Entries dated within `start..=end`, plus entries without a date.
    pub fn entries_in_range(&self, start: Date, end: Date) -> Result<Vec<StoredEntry>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ENTRIES_IN_RANGE_SQL)
            .fetch_context("Failed to prepare query")?;
        let entries = stmt
            .query_map(params![start.to_string(), end.to_string()], entry_from_row)
            .fetch_context("Failed to query entries")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .fetch_context("Failed to read entries")?;
        Ok(entries)
    }

    /// Reassigns an entry to another resource. Returns whether it existed.
    pub fn move_entry(&mut self, id: i64, resource_id: i64) -> Result<bool> {
        let updated = self
            .connection
            .execute(UPDATE_ENTRY_RESOURCE_SQL, params![resource_id, id])
            .fetch_context("Failed to move entry")?;
        Ok(updated > 0)
    }

    pub fn delete_entry(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_ENTRY_SQL, params![id])
            .fetch_context("Failed to delete entry")?;
        Ok(deleted > 0)
    }

    pub fn get_view(&self) -> Result<Option<StoredView>> {
        self.connection
            .query_row(SELECT_VIEW_SQL, [], |row| {
                Ok(StoredView {
                    year: row.get(0)?,
                    month: row.get(1)?,
                })
            })
            .optional()
            .fetch_context("Failed to get view")
    }

    pub fn set_view(&mut self, view: StoredView) -> Result<()> {
        self.connection
            .execute(UPSERT_VIEW_SQL, params![view.year, view.month])
            .fetch_context("Failed to store view")?;
        Ok(())
    }
}

//! SQLite storage for resources, entries and the viewed month.
//!
//! The planner core never talks to the database. The CLI's host opens a
//! [`Database`] per operation on a blocking thread and turns the stored rows
//! into planner objects.

use std::path::Path;

use rota_core::error::{FetchResultExt, Result};
use rusqlite::Connection;

pub mod migrations;
pub mod queries;

/// A stored resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub id: i64,
    pub name: String,
}

/// A stored entry. `date` is kept as text and may be missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: i64,
    pub resource_id: Option<i64>,
    pub date: Option<String>,
    pub title: String,
}

/// The stored month selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredView {
    pub year: i64,
    pub month: i64,
}

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            Connection::open(path).fetch_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

//! Database schema initialization.

use rota_core::error::{FetchResultExt, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Entries follow their resource on delete
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .fetch_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .fetch_context("Failed to initialize database schema")?;

        Ok(())
    }
}

//! Data models for the planner grid.
//!
//! The grid is made of [`DayDescriptor`] columns and [`ResourceRow`] rows.
//! [`EntryRecord`] values are transient: they are read from the host, merged
//! into rows by [`crate::planner::reconcile`], and dropped.
//!
//! # Examples
//!
//! ```rust
//! use jiff::civil::date;
//! use rota_core::{calendar::DateKey, models::{ObjectId, ResourceRow}};
//!
//! let mut row = ResourceRow::new(ObjectId::new("resource-1"), "Alice");
//! let key = DateKey::encode(date(2024, 2, 10));
//! row.set_cell(key.clone(), ObjectId::new("entry-7"), "On call");
//!
//! assert_eq!(row.content_at(&key), Some("On call"));
//! ```

pub mod day;
pub mod entry;
pub mod field;
pub mod ids;
pub mod row;

#[cfg(test)]
mod tests;

pub use day::DayDescriptor;
pub use entry::{EntryRecord, DEFAULT_ENTRY_CONTENT};
pub use field::FieldValue;
pub use ids::ObjectId;
pub use row::ResourceRow;

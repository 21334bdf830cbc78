//! Calendar grid construction and column keys.
//!
//! - [`grid`]: builds the ordered day sequence for a month
//! - [`date_key`]: encodes days as stable column identifiers

pub mod date_key;
pub mod grid;

pub use date_key::DateKey;
pub use grid::{build_month, target_month_range, DateRange, GridOptions};

//! Core library for the Rota resource planner.
//!
//! This crate builds a resource-by-day planning grid: rows are resources,
//! columns are the days of a month grouped into ISO weeks, and each cell holds
//! at most one scheduled entry. It does not fetch or persist anything itself;
//! a host implementing the [`host`] traits supplies objects and change
//! notices, and the [`PlannerController`] keeps the grid in step with them.
//!
//! # Architecture
//!
//! - **Calendar** ([`calendar`]): Month day-grid construction and stable
//!   column keys
//! - **Models** ([`models`]): Days, rows and entry records
//! - **Planner** ([`planner`]): Row store, reconciliation, watch bookkeeping
//!   and the controller that drives full loads and scoped reloads
//! - **Host** ([`host`]): Collaborator traits plus an in-memory host
//! - **Display Wrappers** ([`display`]): Markdown rendering for terminals
//!
//! Incremental updates only re-fetch the resources a change notice touches.
//! Everything else in the grid is left as it was.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use jiff::civil::date;
//! use rota_core::{
//!     display::PlannerTable,
//!     host::{MemoryHost, MemoryObject},
//!     PlannerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = Arc::new(MemoryHost::new());
//! host.insert(MemoryObject::resource("r1", "Alice"));
//! host.insert(MemoryObject::entry("e1", "r1", date(2024, 2, 10), "On call"));
//!
//! let mut planner = PlannerBuilder::new(host)
//!     .with_config(Default::default())
//!     .build()?;
//! planner
//!     .load(Some(MemoryObject::context("view", 2024, 2)))
//!     .await;
//!
//! println!("{}", PlannerTable::new(planner.days(), planner.rows()));
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod display;
pub mod error;
pub mod host;
pub mod models;
pub mod planner;
pub mod validation;

// Re-export commonly used types
pub use calendar::{build_month, DateKey, DateRange, GridOptions};
pub use config::{ActionSpec, ClickKind, PlannerConfig};
pub use display::{Messages, MonthCalendar, PlannerTable};
pub use error::{PlannerError, Result};
pub use host::{ChangeNotice, PlannerHost, WatchRegistry};
pub use models::{DayDescriptor, EntryRecord, FieldValue, ObjectId, ResourceRow};
pub use planner::{PlannerBuilder, PlannerController, PlannerState};
pub use validation::{MessageLog, Severity, ValidationMessage};

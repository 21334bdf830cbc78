//! Markdown rendering of the planner.
//!
//! Like the rest of the crate's output, everything here is a thin `Display`
//! wrapper over borrowed data. Front ends decide how the markdown is shown.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ days, rows,     │    │   PlannerTable  │    │    Markdown     │
//! │ MessageLog      │───▶│   MonthCalendar │───▶│     output      │
//! │                 │    │   Messages      │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`table`]: Resource by day table, one section per week
//! - [`calendar`]: Month overview of a day grid
//! - [`messages`]: Validation and warning list
//!
//! # Examples
//!
//! ```rust
//! use jiff::civil::date;
//! use rota_core::{
//!     calendar::{build_month, GridOptions},
//!     display::PlannerTable,
//!     models::{ObjectId, ResourceRow},
//! };
//!
//! let days = build_month(2, 2024, GridOptions::default(), date(2024, 2, 14));
//! let rows = vec![ResourceRow::new(ObjectId::new("r1"), "Alice")];
//!
//! let output = PlannerTable::new(&days, &rows).to_string();
//! assert!(output.contains("| Alice |"));
//! ```

use crate::models::DayDescriptor;

pub mod calendar;
pub mod messages;
pub mod table;

pub use calendar::MonthCalendar;
pub use messages::Messages;
pub use table::PlannerTable;

/// Splits a day grid into its week groups, in order.
pub fn week_groups(days: &[DayDescriptor]) -> Vec<&[DayDescriptor]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for index in 1..=days.len() {
        if index == days.len() || days[index].week_group != days[start].week_group {
            groups.push(&days[start..index]);
            start = index;
        }
    }
    groups
}

/// Makes text safe to place inside a markdown table cell.
pub(crate) fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::calendar::{build_month, GridOptions};

    #[test]
    fn test_week_groups_split_on_week_change() {
        let days = build_month(2, 2024, GridOptions::default(), date(2024, 2, 14));
        let groups = week_groups(&days);

        assert_eq!(groups.len(), 5);
        assert!(groups.iter().all(|g| g.len() == 7));
        assert_eq!(groups[4][0].date, date(2024, 2, 26));
        assert!(week_groups(&[]).is_empty());
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b c");
    }
}

//! Calendar day descriptor produced by the grid builder.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::calendar::DateKey;

/// One column of the planner grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDescriptor {
    /// The calendar day
    pub date: Date,

    /// 1-based counter that increments every time the ISO week changes while
    /// scanning forward through the grid
    pub week_group: u32,

    /// ISO week number (1-53)
    pub iso_week: i8,

    /// `iso_week_year * 100 + iso_week`, unique across year boundaries
    pub iso_year_week: i32,

    /// Whether this day equals the evaluation date given at build time
    pub is_today: bool,

    /// Whether this day belongs to the requested month (edge days padding
    /// out full weeks are `false`)
    pub is_in_target_month: bool,

    /// Column identifier, round-trips to `date`
    pub date_key: DateKey,
}

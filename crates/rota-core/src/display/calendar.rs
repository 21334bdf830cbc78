//! Month overview of a day grid.

use std::fmt;

use super::week_groups;
use crate::models::DayDescriptor;

/// Markdown calendar with one line per week group.
///
/// Days of adjoining months are shown in parentheses and today is bold.
/// Weeks cut short by a partial grid leave their missing weekdays empty.
pub struct MonthCalendar<'a>(pub &'a [DayDescriptor]);

impl fmt::Display for MonthCalendar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No days in grid.");
        }

        writeln!(f, "| Week | Mon | Tue | Wed | Thu | Fri | Sat | Sun |")?;
        writeln!(f, "|---|---|---|---|---|---|---|---|")?;

        for week in week_groups(self.0) {
            let mut cells: [String; 7] = Default::default();
            for day in week {
                let slot = usize::try_from(day.date.weekday().to_monday_zero_offset())
                    .unwrap_or_default();
                let number = day.date.day();
                cells[slot] = match (day.is_today, day.is_in_target_month) {
                    (true, true) => format!("**{number}**"),
                    (true, false) => format!("**({number})**"),
                    (false, true) => number.to_string(),
                    (false, false) => format!("({number})"),
                };
            }
            write!(f, "| {} |", week[0].iso_week)?;
            for cell in &cells {
                write!(f, " {cell} |")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::calendar::{build_month, GridOptions};

    #[test]
    fn test_full_weeks_calendar() {
        let days = build_month(2, 2024, GridOptions::default(), date(2024, 2, 14));
        let output = MonthCalendar(&days).to_string();

        assert!(output.starts_with("| Week | Mon |"));
        assert!(output.contains("| 5 | (29) | (30) | (31) | 1 | 2 | 3 | 4 |"));
        assert!(output.contains("**14**"));
        assert!(output.contains("| 9 | 26 | 27 | 28 | 29 | (1) | (2) | (3) |"));
    }

    #[test]
    fn test_partial_week_leaves_slots_empty() {
        let days = build_month(2, 2024, GridOptions { full_weeks: false }, date(2000, 1, 1));
        let output = MonthCalendar(&days).to_string();

        assert!(output.contains("| 5 |  |  |  | 1 | 2 | 3 | 4 |"));
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(MonthCalendar(&[]).to_string(), "No days in grid.\n");
    }
}

//! Resource by day table.

use std::fmt;

use super::{escape_cell, week_groups};
use crate::models::{DayDescriptor, ResourceRow};

/// Markdown table of the planner, one section per week.
///
/// Days outside the target month are shown but left blank; today's column
/// header is emphasised.
pub struct PlannerTable<'a> {
    days: &'a [DayDescriptor],
    rows: &'a [ResourceRow],
}

impl<'a> PlannerTable<'a> {
    pub fn new(days: &'a [DayDescriptor], rows: &'a [ResourceRow]) -> Self {
        Self { days, rows }
    }
}

impl fmt::Display for PlannerTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "No resources found.");
        }
        if self.days.is_empty() {
            return writeln!(f, "No days to show.");
        }

        for (index, week) in week_groups(self.days).into_iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let first = &week[0];
            writeln!(
                f,
                "## Week {} ({}-W{:02})",
                first.iso_week,
                first.iso_year_week / 100,
                first.iso_week
            )?;
            writeln!(f)?;

            write!(f, "| Resource |")?;
            for day in week {
                let label = day.date.strftime("%a %d");
                if day.is_today {
                    write!(f, " **{label}** |")?;
                } else {
                    write!(f, " {label} |")?;
                }
            }
            writeln!(f)?;

            write!(f, "|---|")?;
            for _ in week {
                write!(f, "---|")?;
            }
            writeln!(f)?;

            for row in self.rows {
                write!(f, "| {} |", escape_cell(&row.label))?;
                for day in week {
                    let content = if day.is_in_target_month {
                        row.content_at(&day.date_key).unwrap_or_default()
                    } else {
                        ""
                    };
                    write!(f, " {} |", escape_cell(content))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

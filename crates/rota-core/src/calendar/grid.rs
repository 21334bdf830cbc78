//! Month day-grid construction.

use jiff::{civil::Date, ToSpan};
use serde::{Deserialize, Serialize};

use super::DateKey;
use crate::models::DayDescriptor;

/// Options for [`build_month`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Pad the grid out to whole ISO weeks (Monday through Sunday)
    pub full_weeks: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { full_weeks: true }
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Whether `date` lies within the range, bounds included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Builds the ordered day grid for `month`/`year`.
///
/// The sequence is contiguous and strictly increasing. With
/// `full_weeks` it starts on the Monday of the ISO week holding the first
/// of the month and ends on the Sunday of the week holding the last day.
/// `today` is the evaluation date used for [`DayDescriptor::is_today`].
///
/// Invalid month/year combinations yield an empty grid rather than an
/// error.
///
/// # Examples
///
/// ```rust
/// use jiff::civil::date;
/// use rota_core::calendar::{build_month, GridOptions};
///
/// let days = build_month(2, 2024, GridOptions::default(), date(2024, 2, 14));
/// assert_eq!(days.first().unwrap().date, date(2024, 1, 29));
/// assert_eq!(days.last().unwrap().date, date(2024, 3, 3));
/// assert_eq!(days.len(), 35);
/// ```
pub fn build_month(month: i32, year: i32, options: GridOptions, today: Date) -> Vec<DayDescriptor> {
    let Some((start, end)) = grid_bounds(month, year, options) else {
        log::debug!("build_month: no grid for {year}-{month}");
        return Vec::new();
    };

    let mut days = Vec::new();
    let mut previous_week = None;
    let mut week_group = 0;
    let mut day = start;

    loop {
        let iso = day.iso_week_date();
        if previous_week != Some(iso.week()) {
            week_group += 1;
            previous_week = Some(iso.week());
        }

        days.push(DayDescriptor {
            date: day,
            week_group,
            iso_week: iso.week(),
            iso_year_week: i32::from(iso.year()) * 100 + i32::from(iso.week()),
            is_today: day == today,
            is_in_target_month: i32::from(day.month()) == month,
            date_key: DateKey::encode(day),
        });

        if day >= end {
            break;
        }
        match day.tomorrow() {
            Ok(next) => day = next,
            Err(_) => break,
        }
    }

    days
}

/// First and last day of the grid, inclusive.
fn grid_bounds(month: i32, year: i32, options: GridOptions) -> Option<(Date, Date)> {
    let month = i8::try_from(month).ok()?;
    let year = i16::try_from(year).ok()?;
    let first = Date::new(year, month, 1).ok()?;
    let last = first.last_of_month();

    if !options.full_weeks {
        return Some((first, last));
    }

    let back = i32::from(first.weekday().to_monday_zero_offset());
    let forward = 6 - i32::from(last.weekday().to_monday_zero_offset());
    let start = first.checked_sub(back.days()).ok()?;
    let end = last.checked_add(forward.days()).ok()?;
    Some((start, end))
}

/// Range spanned by the days that belong to the requested month.
pub fn target_month_range(days: &[DayDescriptor]) -> Option<DateRange> {
    let mut in_month = days.iter().filter(|d| d.is_in_target_month);
    let start = in_month.next()?.date;
    let end = in_month.last().map_or(start, |d| d.date);
    Some(DateRange { start, end })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn full(month: i32, year: i32) -> Vec<DayDescriptor> {
        build_month(month, year, GridOptions::default(), date(2000, 1, 1))
    }

    #[test]
    fn test_february_2024_full_weeks() {
        let days = build_month(2, 2024, GridOptions::default(), date(2024, 2, 14));

        assert_eq!(days.first().unwrap().date, date(2024, 1, 29));
        assert_eq!(days.last().unwrap().date, date(2024, 3, 3));
        assert_eq!(days.first().unwrap().week_group, 1);
        assert_eq!(days.last().unwrap().week_group, 5);

        let in_month: Vec<_> = days.iter().filter(|d| d.is_in_target_month).collect();
        assert_eq!(in_month.len(), 29);
        assert_eq!(in_month.first().unwrap().date, date(2024, 2, 1));
        assert_eq!(in_month.last().unwrap().date, date(2024, 2, 29));

        let today: Vec<_> = days.iter().filter(|d| d.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2024, 2, 14));
    }

    #[test]
    fn test_full_weeks_are_multiple_of_seven() {
        for year in [1999, 2020, 2021, 2024, 2026] {
            for month in 1..=12 {
                let days = full(month, year);
                assert_eq!(days.len() % 7, 0, "{year}-{month}");
                assert!(days.iter().any(|d| d.is_in_target_month), "{year}-{month}");
                assert_eq!(days[0].date.weekday(), jiff::civil::Weekday::Monday);
            }
        }
    }

    #[test]
    fn test_grid_is_contiguous_and_increasing() {
        let days = full(12, 2024);
        for pair in days.windows(2) {
            assert_eq!(pair[0].date.tomorrow().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn test_partial_weeks_include_last_day() {
        let options = GridOptions { full_weeks: false };
        let days = build_month(4, 2024, options, date(2000, 1, 1));

        assert_eq!(days.len(), 30);
        assert_eq!(days.first().unwrap().date, date(2024, 4, 1));
        assert_eq!(days.last().unwrap().date, date(2024, 4, 30));
        assert!(days.iter().all(|d| d.is_in_target_month));
    }

    #[test]
    fn test_week_group_follows_iso_week_changes() {
        let days = full(2, 2024);
        for pair in days.windows(2) {
            let expected = if pair[0].iso_week == pair[1].iso_week {
                pair[0].week_group
            } else {
                pair[0].week_group + 1
            };
            assert_eq!(pair[1].week_group, expected);
        }
    }

    #[test]
    fn test_iso_year_week_across_year_boundary() {
        // 2024-12-30 is in ISO week 1 of 2025.
        let days = full(12, 2024);
        let dec_30 = days.iter().find(|d| d.date == date(2024, 12, 30)).unwrap();
        assert_eq!(dec_30.iso_week, 1);
        assert_eq!(dec_30.iso_year_week, 202_501);

        let dec_2 = days.iter().find(|d| d.date == date(2024, 12, 2)).unwrap();
        assert_eq!(dec_2.iso_year_week, 202_449);
    }

    #[test]
    fn test_date_keys_round_trip() {
        for day in full(3, 2024) {
            assert_eq!(day.date_key.decode().unwrap(), day.date);
        }
    }

    #[test]
    fn test_invalid_input_is_permissive() {
        assert!(full(0, 2024).is_empty());
        assert!(full(13, 2024).is_empty());
        assert!(full(1, 100_000).is_empty());
    }

    #[test]
    fn test_target_month_range() {
        let days = full(2, 2024);
        let range = target_month_range(&days).unwrap();
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));
        assert!(range.contains(date(2024, 2, 10)));
        assert!(!range.contains(date(2024, 1, 31)));

        assert_eq!(target_month_range(&[]), None);
    }
}

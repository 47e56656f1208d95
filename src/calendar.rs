//! Calendar helpers shared by the pipeline and the seasonal table.

use chrono::{Datelike, NaiveDate};

/// Number of days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> usize {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// `M/D` label without leading zeros, e.g. `1/5` or `12/31`.
pub fn day_label(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Labels for every day of `year`, Jan 1 through Dec 31.
pub fn year_day_labels(year: i32) -> Vec<String> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|start| {
            start
                .iter_days()
                .take_while(|d| d.year() == year)
                .map(day_label)
                .collect()
        })
        .unwrap_or_default()
}

/// Every date from `start` through `end`, inclusive. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_year_handles_leap_years() {
        assert_eq!(days_in_year(2023), 365);
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }

    #[test]
    fn test_labels_have_no_leading_zeros() {
        let labels = year_day_labels(2023);
        assert_eq!(labels.len(), 365);
        assert_eq!(labels[0], "1/1");
        assert_eq!(labels[9], "1/10");
        assert_eq!(labels[364], "12/31");
    }

    #[test]
    fn test_leap_year_labels_include_feb_29() {
        let labels = year_day_labels(2024);
        assert_eq!(labels.len(), 366);
        assert!(labels.contains(&"2/29".to_string()));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 2, 2).unwrap();
        assert_eq!(date_range(start, end).len(), 4);
        assert!(date_range(end, start).is_empty());
    }
}

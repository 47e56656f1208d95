//! Converts raw USGS daily values into a gap-free daily series.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::calendar::date_range;
use crate::error::{ForecastError, Result};
use crate::logging::{DataSource, Logger};
use crate::model::{CleanedPoint, CleanedSeries, RawReading};

/// Cleans raw readings into one row per calendar day.
///
/// - Values ≤ 0 (and non-finite values) become `None`; sensor faults and
///   negative flow must not bias the model.
/// - Days between the first and last reading that the source skipped are
///   inserted as `None` rows. No interpolation.
/// - Qualifiers are dropped.
///
/// # Errors
/// - `NoData`: `readings` is empty.
/// - `InvalidArgument`: a record lacks a date or value, either field fails
///   to parse, or two records share a date.
pub fn clean(readings: &[RawReading], logger: &Logger) -> Result<CleanedSeries> {
    if readings.is_empty() {
        logger.warn(DataSource::Pipeline, None, "Received empty data for cleaning");
        return Err(ForecastError::NoData("Cannot clean empty data".to_string()));
    }

    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    for (index, reading) in readings.iter().enumerate() {
        let (date, value) = parse_reading(index, reading)?;
        if by_date.insert(date, value).is_some() {
            return Err(ForecastError::InvalidArgument(format!(
                "Data cleaning failed: duplicate reading for {}",
                date
            )));
        }
    }

    // by_date is non-empty here, so both bounds exist.
    let (Some(first), Some(last)) = (by_date.keys().next(), by_date.keys().next_back()) else {
        return Err(ForecastError::NoData("Cannot clean empty data".to_string()));
    };

    let points: Vec<CleanedPoint> = date_range(*first, *last)
        .into_iter()
        .map(|date| CleanedPoint {
            date,
            value: by_date.get(&date).copied().flatten(),
        })
        .collect();

    let series = CleanedSeries { points };
    logger.info(
        DataSource::Pipeline,
        None,
        &format!(
            "Cleaned data: {} rows, {} valid values",
            series.len(),
            series.valid_count()
        ),
    );

    Ok(series)
}

/// Parses the date and value of one raw record.
///
/// The value is `None` when it is zero, negative, or not finite.
pub(crate) fn parse_reading(index: usize, reading: &RawReading) -> Result<(NaiveDate, Option<f64>)> {
    let raw_date = reading.date_time.as_deref().ok_or_else(|| {
        ForecastError::InvalidArgument(format!("Missing required field 'dateTime' in record {}", index))
    })?;
    let raw_value = reading.value.as_deref().ok_or_else(|| {
        ForecastError::InvalidArgument(format!("Missing required field 'value' in record {}", index))
    })?;

    let date = parse_date(raw_date).ok_or_else(|| {
        ForecastError::InvalidArgument(format!(
            "Data cleaning failed: unparseable date '{}' in record {}",
            raw_date, index
        ))
    })?;

    let value: f64 = raw_value.trim().parse().map_err(|_| {
        ForecastError::InvalidArgument(format!(
            "Data cleaning failed: could not convert '{}' to float in record {}",
            raw_value, index
        ))
    })?;

    let value = if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    };

    Ok((date, value))
}

/// Accepts `YYYY-MM-DD` optionally followed by a `T...` time part, which is
/// how the DV service stamps daily values.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    fn logger() -> Logger {
        Logger::capture(LogLevel::Debug)
    }

    fn sample_usgs_data() -> Vec<RawReading> {
        vec![
            RawReading::new("2023-01-01T00:00:00.000", "1000"),
            RawReading::new("2023-01-02T00:00:00.000", "1100"),
            RawReading::new("2023-01-03T00:00:00.000", "1050"),
            RawReading::new("2023-01-04T00:00:00.000", "0"),
            RawReading::new("2023-01-05T00:00:00.000", "-10"),
        ]
    }

    #[test]
    fn test_basic_cleaning_keeps_one_row_per_day() {
        let series = clean(&sample_usgs_data(), &logger()).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(Some(series.points[0].date), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2023, 1, 5));
    }

    #[test]
    fn test_replaces_zero_and_negative_with_null() {
        let series = clean(&sample_usgs_data(), &logger()).unwrap();
        assert_eq!(series.points[0].value, Some(1000.0));
        assert_eq!(series.points[1].value, Some(1100.0));
        assert_eq!(series.points[2].value, Some(1050.0));
        assert_eq!(series.points[3].value, None, "zero must be nulled");
        assert_eq!(series.points[4].value, None, "negative must be nulled");
    }

    #[test]
    fn test_usgs_sentinel_is_nulled() {
        let readings = vec![
            RawReading::new("2023-01-01", "-999999"),
            RawReading::new("2023-01-02", "12.5"),
        ];
        let series = clean(&readings, &logger()).unwrap();
        assert_eq!(series.points[0].value, None);
        assert_eq!(series.points[1].value, Some(12.5));
    }

    #[test]
    fn test_fills_missing_dates_with_null() {
        let readings = vec![
            RawReading::new("2023-01-01", "1000"),
            // 2023-01-02 is missing
            RawReading::new("2023-01-03", "950"),
        ];
        let series = clean(&readings, &logger()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points[1].date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(series.points[1].value, None);
    }

    #[test]
    fn test_output_is_sorted_without_duplicates() {
        let readings = vec![
            RawReading::new("2023-03-02", "5"),
            RawReading::new("2023-02-27", "7"),
            RawReading::new("2023-03-01", "6"),
        ];
        let series = clean(&readings, &logger()).unwrap();

        // Feb 27 through Mar 2 in a non-leap year is 4 days.
        assert_eq!(series.len(), 4);
        for pair in series.points.windows(2) {
            assert!(pair[0].date < pair[1].date, "dates must be strictly ascending");
        }
        assert_eq!(series.points[0].value, Some(7.0));
        assert_eq!(series.points[3].value, Some(5.0));
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let result = clean(&[], &logger());
        assert!(matches!(result, Err(ForecastError::NoData(_))));
    }

    #[test]
    fn test_missing_value_field_is_invalid_argument() {
        let readings = vec![RawReading {
            date_time: Some("2023-01-01".into()),
            value: None,
            qualifiers: vec![],
        }];
        let result = clean(&readings, &logger());
        assert!(
            matches!(result, Err(ForecastError::InvalidArgument(ref msg)) if msg.contains("value")),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_missing_date_field_is_invalid_argument() {
        let readings = vec![RawReading {
            date_time: None,
            value: Some("10".into()),
            qualifiers: vec![],
        }];
        let result = clean(&readings, &logger());
        assert!(matches!(result, Err(ForecastError::InvalidArgument(ref msg)) if msg.contains("dateTime")));
    }

    #[test]
    fn test_non_numeric_value_is_invalid_argument() {
        let readings = vec![RawReading::new("2023-01-01", "Ice")];
        assert!(matches!(
            clean(&readings, &logger()),
            Err(ForecastError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_dates_are_invalid_argument() {
        let readings = vec![
            RawReading::new("2023-01-01T00:00:00.000", "10"),
            RawReading::new("2023-01-01", "11"),
        ];
        assert!(matches!(
            clean(&readings, &logger()),
            Err(ForecastError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cleaning_logs_row_and_valid_counts() {
        let logger = logger();
        clean(&sample_usgs_data(), &logger).unwrap();
        assert!(logger
            .entries()
            .iter()
            .any(|e| e.message == "Cleaned data: 5 rows, 3 valid values"));
    }
}

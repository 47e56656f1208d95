//! Core data types for the flow forecast service.
//!
//! This module defines the shared domain model imported by all other modules.
//! Every value here is request-scoped: built while answering one forecast
//! request and dropped once the response is formed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single daily-average entry from the `values[0].value[]` array of a
/// USGS Daily Values response.
///
/// Date and value are kept optional so the cleaner, not the parser, decides
/// what an incomplete record means. Values arrive as JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<String>, // e.g. "2023-01-01T00:00:00.000"
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<String>, // "P" = provisional, "A" = approved
}

impl RawReading {
    pub fn new(date_time: &str, value: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            value: Some(value.to_string()),
            qualifiers: vec!["A".to_string()],
        }
    }
}

/// One calendar day of a cleaned series. `None` marks a missing or
/// physically impossible (≤ 0) reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanedPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Gap-free daily series, ascending by date, one row per calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub points: Vec<CleanedPoint>,
}

impl CleanedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Number of rows carrying a usable (non-null) value.
    pub fn valid_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CleanedPoint> {
        self.points.iter()
    }
}

// ---------------------------------------------------------------------------
// Forecast types
// ---------------------------------------------------------------------------

/// Point forecast for one future day with its prediction interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Consecutive forecast days, starting the day after the last observation.
pub type ForecastSegment = Vec<ForecastPoint>;

/// One labeled day of the annual output series.
///
/// A populated row carries either `past_value` or the three forecast
/// columns. Rows added to pad a short series carry nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualRow {
    pub label: String, // "M/D", no leading zeros
    pub past_value: Option<f64>,
    pub forecast: Option<f64>,
    pub lower_error_bound: Option<f64>,
    pub upper_error_bound: Option<f64>,
}

/// Historic values followed by forecast values for one calendar year.
/// `rows.len()` always equals the number of days in `year`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSeries {
    pub year: i32,
    pub rows: Vec<AnnualRow>,
}

impl AnnualSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

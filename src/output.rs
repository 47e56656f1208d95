//! Transport formatting for forecast results.

use serde::Serialize;

use crate::model::AnnualSeries;

/// Message carried by the sentinel record when there is no series at all.
pub const NO_DATA_MESSAGE: &str = "No data found for this site";

/// One labeled day in the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDataPoint {
    /// The `M/D` day label.
    pub index: String,
    pub past_value: Option<f64>,
    pub forecast: Option<f64>,
    pub lower_error_bound: Option<f64>,
    pub upper_error_bound: Option<f64>,
}

/// Either a data point or the single error sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRecord {
    Point(ForecastDataPoint),
    Error { error: String },
}

/// Converts a series into transport records.
///
/// `None` yields exactly one `{"error": ...}` record so "no input" stays
/// distinguishable from an empty result. Nulls pass through as `null`.
pub fn format_output(series: Option<&AnnualSeries>) -> Vec<OutputRecord> {
    let Some(series) = series else {
        return vec![OutputRecord::Error {
            error: NO_DATA_MESSAGE.to_string(),
        }];
    };

    series
        .rows
        .iter()
        .map(|row| {
            OutputRecord::Point(ForecastDataPoint {
                index: row.label.clone(),
                past_value: row.past_value,
                forecast: row.forecast,
                lower_error_bound: row.lower_error_bound,
                upper_error_bound: row.upper_error_bound,
            })
        })
        .collect()
}

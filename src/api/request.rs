//! Inbound request bodies and their field validation.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::model::PARAM_DISCHARGE;

/// Body of `POST /usgs/forecast` and `POST /usgs/seasonal`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastRequest {
    /// USGS site id, 8-15 digits (e.g. "01646500")
    pub site_id: String,
    /// USGS parameter code, 5 digits (e.g. "00060")
    pub reading_parameter: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Query string of the deprecated `GET /forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyForecastQuery {
    pub site_id: String,
    #[serde(default = "default_reading_parameter")]
    pub reading_parameter: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

fn default_reading_parameter() -> String {
    PARAM_DISCHARGE.to_string()
}

impl From<LegacyForecastQuery> for ForecastRequest {
    fn from(q: LegacyForecastQuery) -> Self {
        ForecastRequest {
            site_id: q.site_id,
            reading_parameter: q.reading_parameter,
            start_date: q.start_date,
            end_date: q.end_date,
        }
    }
}

impl ForecastRequest {
    /// Field-level checks. Returns every violation, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(msg) = validate_digits("site_id", &self.site_id, 8, 15) {
            errors.push(msg);
        }
        if let Err(msg) = validate_digits("reading_parameter", &self.reading_parameter, 5, 5) {
            errors.push(msg);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.push("end_date must be after start_date".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Omitted dates default to Jan 1 / Dec 31 of `today`'s year.
    pub fn resolve_dates(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let year = today.year();
        let start = self
            .start_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
            .unwrap_or(today);
        let end = self
            .end_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 12, 31))
            .unwrap_or(today);
        (start, end)
    }
}

fn validate_digits(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{} must contain only digits", field));
    }
    let len = value.len();
    if len < min || len > max {
        return Err(if min == max {
            format!("{} must be {} digits", field, min)
        } else {
            format!("{} must be {}-{} digits long", field, min, max)
        });
    }
    Ok(())
}

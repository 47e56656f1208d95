//! Year-over-year comparison table.
//!
//! Pivots raw daily values so each calendar day (`M/D`) is a row and each
//! year is a column, which makes it easy to overlay seasons on one chart.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::cleaning::parse_reading;
use crate::calendar::day_label;
use crate::error::{ForecastError, Result};
use crate::model::RawReading;

/// One calendar day across every year present in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalRow {
    #[serde(rename = "index")]
    pub label: String,
    /// Keyed by year; `None` where that year has no valid reading for the day.
    pub values: BTreeMap<i32, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalTable {
    pub years: Vec<i32>,
    pub rows: Vec<SeasonalRow>,
}

#[cfg(test)]
impl SeasonalTable {
    fn row(&self, label: &str) -> Option<&SeasonalRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Pivots readings into a `M/D` × year table.
///
/// Rows appear in calendar order and only for days present in at least one
/// year. Values ≤ 0 are nulled as in cleaning.
///
/// # Errors
/// - `NoData`: `readings` is empty.
/// - `InvalidArgument`: a record is incomplete or unparseable, or a date
///   appears twice.
pub fn pivot_by_year(readings: &[RawReading]) -> Result<SeasonalTable> {
    if readings.is_empty() {
        return Err(ForecastError::NoData("No readings to pivot".to_string()));
    }

    let mut cells: BTreeMap<(u32, u32), BTreeMap<i32, Option<f64>>> = BTreeMap::new();
    let mut years = BTreeSet::new();

    for (index, reading) in readings.iter().enumerate() {
        let (date, value) = parse_reading(index, reading)?;
        years.insert(date.year());
        let row = cells.entry((date.month(), date.day())).or_default();
        if row.insert(date.year(), value).is_some() {
            return Err(ForecastError::InvalidArgument(format!(
                "Duplicate reading for {}",
                date
            )));
        }
    }

    let rows = cells
        .into_iter()
        .map(|((month, day), by_year)| {
            let values = years
                .iter()
                .map(|year| (*year, by_year.get(year).copied().flatten()))
                .collect();
            SeasonalRow {
                label: label_for(month, day),
                values,
            }
        })
        .collect();

    Ok(SeasonalTable {
        years: years.into_iter().collect(),
        rows,
    })
}

fn label_for(month: u32, day: u32) -> String {
    // Leap year so 2/29 always resolves.
    NaiveDate::from_ymd_opt(2000, month, day)
        .map(day_label)
        .unwrap_or_else(|| format!("{}/{}", month, day))
}

//! Forecast pipeline orchestrator.
//!
//! fetch → clean → forecast → split historic/forecast → reconcile into one
//! row per day of the current year. One call handles one request; nothing
//! is shared or cached between calls.

use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::analysis::cleaning::clean;
use crate::analysis::seasonal::{SeasonalTable, pivot_by_year};
use crate::calendar::year_day_labels;
use crate::error::{ForecastError, Result};
use crate::forecast::{ForecastModel, forecast_horizon, predict};
use crate::ingest::usgs::DailyValueSource;
use crate::logging::{DataSource, Logger};
use crate::model::{AnnualRow, AnnualSeries, RawReading};

pub struct ForecastPipeline {
    source: Arc<dyn DailyValueSource>,
    model: Arc<dyn ForecastModel>,
    logger: Logger,
}

impl ForecastPipeline {
    pub fn new(
        source: Arc<dyn DailyValueSource>,
        model: Arc<dyn ForecastModel>,
        logger: Logger,
    ) -> Self {
        ForecastPipeline { source, model, logger }
    }

    /// Produces the annual series for `today`'s year.
    ///
    /// `today` decides which year is "current": historic rows are the cleaned
    /// rows inside that year, and the output has one row per day of it.
    /// The historic rows are assumed to end where the forecast begins, so
    /// `end_date` should be at or near `today`.
    pub fn run(
        &self,
        site_id: &str,
        reading_parameter: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<AnnualSeries> {
        self.logger.info(
            DataSource::Pipeline,
            Some(site_id),
            &format!(
                "Generating forecast for parameter {} from {} to {}",
                reading_parameter, start_date, end_date
            ),
        );

        let readings = self.fetch(site_id, reading_parameter, start_date, end_date)?;

        let cleaned = clean(&readings, &self.logger)
            .map_err(|e| self.fail(site_id, reading_parameter, "clean", e))?;
        let Some(last_date) = cleaned.last_date() else {
            let err = ForecastError::NoData(format!("No valid data after cleaning for site {}", site_id));
            return Err(self.fail(site_id, reading_parameter, "clean", err));
        };

        let horizon = forecast_horizon(last_date);
        let forecast = predict(self.model.as_ref(), &cleaned, horizon, &self.logger)
            .map_err(|e| self.fail(site_id, reading_parameter, "forecast", e))?;

        let year = today.year();
        let historic: Vec<AnnualRow> = cleaned
            .iter()
            .filter(|p| p.date.year() == year)
            .map(|p| AnnualRow {
                label: String::new(),
                past_value: p.value,
                forecast: None,
                lower_error_bound: None,
                upper_error_bound: None,
            })
            .collect();
        let historic_len = historic.len();
        let forecast_len = forecast.len();

        let mut rows = historic;
        rows.extend(forecast.into_iter().map(|p| AnnualRow {
            label: String::new(),
            past_value: None,
            forecast: Some(p.point),
            lower_error_bound: Some(p.lower),
            upper_error_bound: Some(p.upper),
        }));

        let labels = year_day_labels(year);
        if rows.len() != labels.len() {
            self.logger.warn(
                DataSource::Pipeline,
                Some(site_id),
                &format!(
                    "Data length mismatch: {} rows but {} days in year. Historic: {}, Forecast: {}",
                    rows.len(),
                    labels.len(),
                    historic_len,
                    forecast_len
                ),
            );
        }
        let rows = reconcile_length(rows, labels.len());

        let rows: Vec<AnnualRow> = rows
            .into_iter()
            .zip(labels)
            .map(|(row, label)| AnnualRow { label, ..row })
            .collect();

        self.logger.info(
            DataSource::Pipeline,
            Some(site_id),
            &format!("Generated forecast with {} data points", rows.len()),
        );

        Ok(AnnualSeries { year, rows })
    }

    /// Fetches readings and pivots them into a `M/D` × year table.
    pub fn seasonal(
        &self,
        site_id: &str,
        reading_parameter: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SeasonalTable> {
        let readings = self.fetch(site_id, reading_parameter, start_date, end_date)?;
        pivot_by_year(&readings).map_err(|e| self.fail(site_id, reading_parameter, "pivot", e))
    }

    fn fetch(
        &self,
        site_id: &str,
        reading_parameter: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawReading>> {
        let readings = self
            .source
            .fetch(site_id, reading_parameter, start_date, end_date)
            .map_err(|e| self.fail(site_id, reading_parameter, "fetch", e))?;

        if readings.is_empty() {
            let err = ForecastError::NoData(format!("No data available for site {}", site_id));
            return Err(self.fail(site_id, reading_parameter, "fetch", err));
        }
        Ok(readings)
    }

    fn fail(&self, site_id: &str, reading_parameter: &str, phase: &str, err: ForecastError) -> ForecastError {
        self.logger.log_usgs_failure(site_id, reading_parameter, phase, &err);
        err
    }
}

/// Pads with all-null rows or truncates from the end so `rows.len() == target`.
pub fn reconcile_length(mut rows: Vec<AnnualRow>, target: usize) -> Vec<AnnualRow> {
    if rows.len() > target {
        rows.truncate(target);
    } else {
        rows.resize_with(target, || AnnualRow {
            label: String::new(),
            past_value: None,
            forecast: None,
            lower_error_bound: None,
            upper_error_bound: None,
        });
    }
    rows
}

//! Forecast adapter.
//!
//! The statistical engine sits behind `ForecastModel`; this module only
//! decides how far ahead to forecast, asks the engine for a fixed 50%
//! prediction interval, and rounds what comes back.

pub mod ets;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::calendar::days_in_year;
use crate::error::{ForecastError, Result};
use crate::logging::{DataSource, Logger};
use crate::model::{CleanedSeries, ForecastPoint, ForecastSegment};

pub use ets::EtsModel;

/// Width of the prediction interval requested from every model.
pub const PREDICTION_INTERVAL_WIDTH: f64 = 0.50;

/// Why a model could not produce a forecast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("series has {found} non-null observations, at least {required} required")]
    TooFewObservations { found: usize, required: usize },

    #[error("model fit failed: {0}")]
    Fit(String),

    #[error("model prediction failed: {0}")]
    Predict(String),
}

/// A swappable forecasting engine.
///
/// Implementations fit on the non-null values of `series` and return exactly
/// `horizon` points for the days following `series.last_date()`, each with a
/// lower/upper bound at `interval_width` confidence.
pub trait ForecastModel: Send + Sync {
    fn name(&self) -> &str;

    fn fit_and_predict(
        &self,
        series: &CleanedSeries,
        horizon: usize,
        interval_width: f64,
    ) -> std::result::Result<Vec<ForecastPoint>, ModelError>;
}

/// Days from the day after `last_observed_date` through Dec 31 of that
/// following day's year, inclusive.
///
/// When `last_observed_date` is Dec 31 the following day is Jan 1, so the
/// horizon covers the whole next year (365 or 366) rather than zero.
pub fn forecast_horizon(last_observed_date: NaiveDate) -> usize {
    match last_observed_date.succ_opt() {
        Some(first) => days_in_year(first.year()) - first.ordinal0() as usize,
        None => 0,
    }
}

/// Runs `model` for `horizon_days` and rounds every value to the nearest
/// integer (ties to even).
///
/// # Errors
/// - `InsufficientData`: the model could not fit the series.
/// - `Unclassified`: the model returned the wrong number of points.
pub fn predict(
    model: &dyn ForecastModel,
    series: &CleanedSeries,
    horizon_days: usize,
    logger: &Logger,
) -> Result<ForecastSegment> {
    logger.debug(
        DataSource::Model,
        None,
        &format!(
            "Fitting {} on {} rows ({} valid), horizon {} days",
            model.name(),
            series.len(),
            series.valid_count(),
            horizon_days
        ),
    );

    let raw = model
        .fit_and_predict(series, horizon_days, PREDICTION_INTERVAL_WIDTH)
        .map_err(|e| ForecastError::InsufficientData(e.to_string()))?;

    if raw.len() != horizon_days {
        return Err(ForecastError::Unclassified(format!(
            "{} returned {} points for a {}-day horizon",
            model.name(),
            raw.len(),
            horizon_days
        )));
    }

    Ok(raw
        .into_iter()
        .map(|p| ForecastPoint {
            point: p.point.round_ties_even(),
            lower: p.lower.round_ties_even(),
            upper: p.upper.round_ties_even(),
        })
        .collect())
}

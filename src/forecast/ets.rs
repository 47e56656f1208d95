//! Default forecasting engine, backed by `augurs`.
//!
//! Null days are dropped before fitting. Records spanning several full years
//! go through MSTL with a yearly period and an AutoETS trend; shorter records
//! use non-seasonal AutoETS.

use augurs::{Forecast, ets::AutoETS, forecaster::Forecaster, mstl::MSTLModel};

use super::{ForecastModel, ModelError};
use crate::model::{CleanedSeries, ForecastPoint};

/// Fewest non-null observations the engine will fit on.
const MIN_OBSERVATIONS: usize = 2;

/// Yearly seasonality period, in daily observations.
const YEARLY_PERIOD: usize = 365;

/// Observations needed before the yearly decomposition is used.
const MIN_SEASONAL_OBSERVATIONS: usize = 3 * YEARLY_PERIOD;

#[derive(Debug, Clone, Default)]
pub struct EtsModel;

impl EtsModel {
    fn forecast(values: &[f64], horizon: usize, level: f64) -> Result<Forecast, ModelError> {
        if values.len() >= MIN_SEASONAL_OBSERVATIONS {
            let trend = AutoETS::non_seasonal().into_trend_model();
            let mut forecaster = Forecaster::new(MSTLModel::new(vec![YEARLY_PERIOD], trend));
            forecaster
                .fit(values)
                .map_err(|e| ModelError::Fit(format!("MSTL fit error: {}", e)))?;
            forecaster
                .predict(horizon, level)
                .map_err(|e| ModelError::Predict(format!("MSTL predict error: {}", e)))
        } else {
            let mut forecaster = Forecaster::new(AutoETS::non_seasonal());
            forecaster
                .fit(values)
                .map_err(|e| ModelError::Fit(format!("ETS fit error: {}", e)))?;
            forecaster
                .predict(horizon, level)
                .map_err(|e| ModelError::Predict(format!("ETS predict error: {}", e)))
        }
    }
}

impl ForecastModel for EtsModel {
    fn name(&self) -> &str {
        "augurs-ets"
    }

    fn fit_and_predict(
        &self,
        series: &CleanedSeries,
        horizon: usize,
        interval_width: f64,
    ) -> Result<Vec<ForecastPoint>, ModelError> {
        let values: Vec<f64> = series.iter().filter_map(|p| p.value).collect();
        if values.len() < MIN_OBSERVATIONS {
            return Err(ModelError::TooFewObservations {
                found: values.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        let forecast = Self::forecast(&values, horizon, interval_width)?;
        let intervals = forecast
            .intervals
            .ok_or_else(|| ModelError::Predict("no prediction intervals returned".to_string()))?;

        Ok(forecast
            .point
            .iter()
            .zip(intervals.lower.iter().zip(intervals.upper.iter()))
            .map(|(&point, (&lower, &upper))| ForecastPoint { point, lower, upper })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date_range;
    use crate::model::CleanedPoint;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Daily flows with a weekly wobble and a slow recession.
    fn flow_series(start: NaiveDate, end: NaiveDate, null_every: Option<usize>) -> CleanedSeries {
        CleanedSeries {
            points: date_range(start, end)
                .into_iter()
                .enumerate()
                .map(|(i, d)| {
                    let value = 1200.0 - i as f64 * 1.5 + 60.0 * (i as f64 / 7.0).sin();
                    let missing = null_every.is_some_and(|n| i % n == n - 1);
                    CleanedPoint { date: d, value: if missing { None } else { Some(value) } }
                })
                .collect(),
        }
    }

    #[test]
    fn test_returns_one_point_per_horizon_day() {
        let series = flow_series(date(2023, 1, 1), date(2023, 4, 30), None);
        let points = EtsModel.fit_and_predict(&series, 245, 0.5).unwrap();

        assert_eq!(points.len(), 245);
        for p in &points {
            assert!(p.point.is_finite());
            assert!(p.lower <= p.point && p.point <= p.upper);
        }
    }

    #[test]
    fn test_null_days_are_skipped() {
        let series = flow_series(date(2023, 1, 1), date(2023, 3, 31), Some(5));
        assert!(series.valid_count() < series.len());

        let points = EtsModel.fit_and_predict(&series, 30, 0.5).unwrap();
        assert_eq!(points.len(), 30);
        assert!(points.iter().all(|p| p.point.is_finite()));
    }

    #[test]
    fn test_multi_year_record_uses_yearly_decomposition() {
        let series = flow_series(date(2020, 1, 1), date(2022, 12, 31), None);
        assert!(series.valid_count() >= MIN_SEASONAL_OBSERVATIONS);

        let points = EtsModel.fit_and_predict(&series, 90, 0.5).unwrap();
        assert_eq!(points.len(), 90);
        assert!(points.iter().all(|p| p.lower <= p.upper));
    }

    #[test]
    fn test_too_few_observations() {
        let series = CleanedSeries {
            points: vec![
                CleanedPoint { date: date(2023, 1, 1), value: None },
                CleanedPoint { date: date(2023, 1, 2), value: Some(10.0) },
            ],
        };
        assert_eq!(
            EtsModel.fit_and_predict(&series, 3, 0.5),
            Err(ModelError::TooFewObservations { found: 1, required: 2 })
        );
    }
}

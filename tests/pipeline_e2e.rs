/// End-to-end pipeline tests: raw USGS-shaped readings in, one labeled row
/// per day of the current year out.
///
/// The upstream source is an in-memory stub. Most tests use a recording
/// model that repeats the last valid value; one runs the default engine.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use flow_forecast_service::error::{ForecastError, Result};
use flow_forecast_service::calendar::date_range;
use flow_forecast_service::forecast::{EtsModel, ForecastModel, ModelError};
use flow_forecast_service::ingest::usgs::DailyValueSource;
use flow_forecast_service::logging::{LogLevel, Logger};
use flow_forecast_service::model::{CleanedSeries, ForecastPoint, RawReading};
use flow_forecast_service::output::{OutputRecord, format_output};
use flow_forecast_service::pipeline::ForecastPipeline;

struct StubSource(Vec<RawReading>);

impl DailyValueSource for StubSource {
    fn fetch(&self, _: &str, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<RawReading>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct RecordingModel {
    seen: Mutex<Option<(CleanedSeries, usize, f64)>>,
}

impl ForecastModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    fn fit_and_predict(
        &self,
        series: &CleanedSeries,
        horizon: usize,
        interval_width: f64,
    ) -> std::result::Result<Vec<ForecastPoint>, ModelError> {
        *self.seen.lock().unwrap() = Some((series.clone(), horizon, interval_width));
        let values: Vec<f64> = series.iter().filter_map(|p| p.value).collect();
        let Some(&last) = values.last() else {
            return Err(ModelError::TooFewObservations { found: 0, required: 1 });
        };
        Ok(vec![ForecastPoint { point: last, lower: last - 25.5, upper: last + 25.5 }; horizon])
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn potomac_readings() -> Vec<RawReading> {
    vec![
        RawReading::new("2023-01-01T00:00:00.000", "1000"),
        RawReading::new("2023-01-02T00:00:00.000", "1100"),
        RawReading::new("2023-01-03T00:00:00.000", "1050"),
        RawReading::new("2023-01-04T00:00:00.000", "0"),
        RawReading::new("2023-01-05T00:00:00.000", "-999999"),
    ]
}

#[test]
fn test_five_readings_become_a_full_year() {
    let model = Arc::new(RecordingModel::default());
    let pipeline = ForecastPipeline::new(
        Arc::new(StubSource(potomac_readings())),
        model.clone(),
        Logger::capture(LogLevel::Debug),
    );

    let series = pipeline
        .run("01646500", "00060", date(2023, 1, 1), date(2023, 12, 31), date(2023, 1, 6))
        .expect("pipeline should succeed");

    let (cleaned, horizon, width) = model.seen.lock().unwrap().clone().expect("model was called");
    let values: Vec<Option<f64>> = cleaned.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![Some(1000.0), Some(1100.0), Some(1050.0), None, None]);
    assert_eq!(horizon, 360);
    assert!((width - 0.5).abs() < 1e-12);

    assert_eq!(series.year, 2023);
    assert_eq!(series.len(), 365);

    let first = &series.rows[0];
    assert_eq!(first.label, "1/1");
    assert_eq!(first.past_value, Some(1000.0));
    assert_eq!(first.forecast, None);

    // Non-positive readings stay in the series as missing history.
    assert_eq!(series.rows[3].label, "1/4");
    assert_eq!(series.rows[3].past_value, None);
    assert_eq!(series.rows[3].forecast, None);

    let sixth = &series.rows[5];
    assert_eq!(sixth.label, "1/6");
    assert_eq!(sixth.past_value, None);
    let point = sixth.forecast.expect("forecast row");
    assert!(sixth.lower_error_bound.unwrap() <= point);
    assert!(point <= sixth.upper_error_bound.unwrap());
    assert_eq!(point, point.round(), "forecast values are whole numbers");

    assert_eq!(series.rows[364].label, "12/31");
    assert!(series.rows[364].forecast.is_some());
}

#[test]
fn test_leap_year_output_has_366_rows() {
    let readings = vec![
        RawReading::new("2024-01-01T00:00:00.000", "400"),
        RawReading::new("2024-01-02T00:00:00.000", "420"),
    ];
    let pipeline = ForecastPipeline::new(
        Arc::new(StubSource(readings)),
        Arc::new(RecordingModel::default()),
        Logger::capture(LogLevel::Debug),
    );

    let series = pipeline
        .run("01646500", "00060", date(2024, 1, 1), date(2024, 12, 31), date(2024, 1, 3))
        .unwrap();

    assert_eq!(series.len(), 366);
    assert_eq!(series.rows[59].label, "2/29");
}

#[test]
fn test_formatted_output_matches_series() {
    let pipeline = ForecastPipeline::new(
        Arc::new(StubSource(potomac_readings())),
        Arc::new(RecordingModel::default()),
        Logger::capture(LogLevel::Debug),
    );
    let series = pipeline
        .run("01646500", "00060", date(2023, 1, 1), date(2023, 12, 31), date(2023, 1, 6))
        .unwrap();

    let records = format_output(Some(&series));
    assert_eq!(records.len(), 365);
    match &records[0] {
        OutputRecord::Point(p) => {
            assert_eq!(p.index, "1/1");
            assert_eq!(p.past_value, Some(1000.0));
        }
        other => panic!("expected a data point, got {:?}", other),
    }
}

#[test]
fn test_all_non_positive_readings_cannot_be_forecast() {
    let readings = vec![
        RawReading::new("2023-01-01T00:00:00.000", "0"),
        RawReading::new("2023-01-02T00:00:00.000", "-999999"),
    ];
    let pipeline = ForecastPipeline::new(
        Arc::new(StubSource(readings)),
        Arc::new(RecordingModel::default()),
        Logger::capture(LogLevel::Debug),
    );

    let err = pipeline
        .run("01646500", "00060", date(2023, 1, 1), date(2023, 12, 31), date(2023, 1, 3))
        .unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)), "got {:?}", err);
}

#[test]
fn test_default_engine_fills_the_rest_of_the_year() {
    let readings: Vec<RawReading> = date_range(date(2023, 1, 1), date(2023, 5, 31))
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let value = 900.0 + 80.0 * (i as f64 / 9.0).sin() - i as f64 * 0.8;
            RawReading::new(&format!("{}T00:00:00.000", d), &format!("{:.1}", value))
        })
        .collect();
    let pipeline = ForecastPipeline::new(
        Arc::new(StubSource(readings)),
        Arc::new(EtsModel),
        Logger::capture(LogLevel::Debug),
    );

    let series = pipeline
        .run("01646500", "00060", date(2023, 1, 1), date(2023, 12, 31), date(2023, 6, 1))
        .expect("pipeline should succeed");

    assert_eq!(series.len(), 365);
    assert!(series.rows[150].past_value.is_some(), "5/31 is history");
    for row in &series.rows[151..] {
        let point = row.forecast.expect("forecast row");
        assert_eq!(point, point.round());
        assert!(row.lower_error_bound.unwrap() <= point);
        assert!(point <= row.upper_error_bound.unwrap());
    }
}

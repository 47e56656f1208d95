/// USGS NWIS Daily Values (DV) API client.
///
/// Handles URL construction, the single outbound request, and JSON response
/// parsing for the USGS Water Services DV endpoint:
///   http://waterservices.usgs.gov/nwis/dv/
///
/// The DV service returns WaterML rendered as JSON:
///   { "value": { "timeSeries": [ { "values": [ { "value": [
///       { "value": "1234", "qualifiers": ["A"], "dateTime": "2023-01-01T00:00:00.000" }
///   ] } ] } ] } }

use chrono::NaiveDate;
use reqwest::Url;
use serde_json::Value;

use crate::config::UsgsConfig;
use crate::error::{ForecastError, Result};
use crate::logging::{DataSource, Logger};
use crate::model::RawReading;

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Anything that can return raw daily readings for a site and parameter.
///
/// `UsgsClient` is the production implementation; tests substitute canned
/// readings.
pub trait DailyValueSource: Send + Sync {
    fn fetch(
        &self,
        site_id: &str,
        reading_parameter: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawReading>>;
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds a USGS DV API URL for one site and parameter over an inclusive
/// date range. Dates are rendered as `YYYY-MM-DD`.
pub fn build_dv_url(
    base_url: &str,
    site_id: &str,
    reading_parameter: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Url> {
    let start = start_date.format("%Y-%m-%d").to_string();
    let end = end_date.format("%Y-%m-%d").to_string();

    Url::parse_with_params(
        base_url,
        &[
            ("format", "json"),
            ("site", site_id),
            ("startDT", start.as_str()),
            ("endDT", end.as_str()),
            ("parameterCd", reading_parameter),
        ],
    )
    .map_err(|e| ForecastError::Unclassified(format!("Invalid USGS base URL '{}': {}", base_url, e)))
}

/// Rejects blank site ids and parameter codes before any request is made.
pub fn validate_fetch_args(site_id: &str, reading_parameter: &str) -> Result<()> {
    if site_id.trim().is_empty() {
        return Err(ForecastError::InvalidArgument("site_id cannot be empty".to_string()));
    }
    if reading_parameter.trim().is_empty() {
        return Err(ForecastError::InvalidArgument(
            "reading_parameter cannot be empty".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a USGS DV API JSON response body into the readings of its first
/// time series.
///
/// # Errors
/// - `UpstreamUnavailable`: the body is not JSON.
/// - `UpstreamContractViolation`: `value`, `timeSeries`, `values`, or the
///   inner `value` list is missing or has the wrong shape.
///
/// A present-but-empty `timeSeries`, `values`, or `value` list is not an
/// error: the site simply has no data for the range.
pub fn parse_dv_response(json: &str) -> Result<Vec<RawReading>> {
    let root: Value = serde_json::from_str(json).map_err(|e| {
        ForecastError::UpstreamUnavailable(format!("Invalid JSON response from USGS API: {}", e))
    })?;

    let envelope = root
        .get("value")
        .ok_or_else(|| contract("API response missing 'value' field"))?;

    let time_series = array_field(envelope, "timeSeries")?;
    let Some(first_series) = time_series.first() else {
        return Ok(Vec::new());
    };

    let values = array_field(first_series, "values")?;
    let Some(first_block) = values.first() else {
        return Ok(Vec::new());
    };

    let entries = array_field(first_block, "value")?;
    entries
        .iter()
        .map(|entry| {
            serde_json::from_value::<RawReading>(entry.clone())
                .map_err(|e| contract(&format!("malformed value entry: {}", e)))
        })
        .collect()
}

fn array_field<'a>(parent: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    match parent.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(contract(&format!("'{}' is not an array", key))),
        None => Err(contract(&format!("API response missing '{}' field", key))),
    }
}

fn contract(message: &str) -> ForecastError {
    ForecastError::UpstreamContractViolation(message.to_string())
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking client for the DV service with bounded connect/read timeouts.
///
/// Must be built outside an async runtime; call `fetch` from a blocking
/// context such as `tokio::task::spawn_blocking`.
pub struct UsgsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    logger: Logger,
}

impl UsgsClient {
    pub fn new(config: &UsgsConfig, logger: Logger) -> Result<Self> {
        // reqwest 0.11 has no separate read timeout; the total request
        // timeout bounds the read.
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| ForecastError::Unclassified(format!("Failed to build HTTP client: {}", e)))?;

        Ok(UsgsClient {
            client,
            base_url: config.base_url.clone(),
            logger,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DailyValueSource for UsgsClient {
    fn fetch(
        &self,
        site_id: &str,
        reading_parameter: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawReading>> {
        validate_fetch_args(site_id, reading_parameter)?;

        let url = build_dv_url(&self.base_url, site_id, reading_parameter, start_date, end_date)?;

        self.logger.info(
            DataSource::Usgs,
            Some(site_id),
            &format!(
                "Fetching USGS data for site {}, parameter {} ({} to {})",
                site_id, reading_parameter, start_date, end_date
            ),
        );

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| {
                ForecastError::UpstreamUnavailable(format!("Failed to connect to USGS API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::UpstreamUnavailable(format!(
                "USGS API request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response.text().map_err(|e| {
            ForecastError::UpstreamUnavailable(format!("Failed to read USGS API response: {}", e))
        })?;

        let readings = parse_dv_response(&body)?;

        if readings.is_empty() {
            self.logger.warn(
                DataSource::Usgs,
                Some(site_id),
                &format!("No time series data found for parameter {}", reading_parameter),
            );
        } else {
            self.logger.info(
                DataSource::Usgs,
                Some(site_id),
                &format!("Successfully fetched {} data points", readings.len()),
            );
        }

        Ok(readings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use serde_json::{Value, json};

use super::request::{ForecastRequest, LegacyForecastQuery};
use super::{ApiError, ApiResult, AppState};
use crate::analysis::seasonal::SeasonalRow;
use crate::error::ForecastError;
use crate::logging::DataSource;
use crate::output::{OutputRecord, format_output};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Flow Forecast API is running" }))
}

/// POST /usgs/forecast
pub async fn usgs_forecast(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<OutputRecord>>> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(vec![e.body_text()]))?;
    run_forecast(state, request, "POST /usgs/forecast").await
}

/// GET /forecast
///
/// Deprecated; kept for older clients. `reading_parameter` defaults to
/// discharge when omitted.
pub async fn legacy_forecast(
    State(state): State<AppState>,
    query: Result<Query<LegacyForecastQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<OutputRecord>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(vec![e.body_text()]))?;
    run_forecast(state, query.into(), "GET /forecast").await
}

/// POST /usgs/seasonal
pub async fn usgs_seasonal(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<SeasonalRow>>> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(vec![e.body_text()]))?;
    request.validate().map_err(ApiError::Validation)?;

    let (start, end) = request.resolve_dates((state.clock)());
    log_request(&state, "POST /usgs/seasonal", &request);

    let pipeline = state.pipeline.clone();
    let table = tokio::task::spawn_blocking(move || {
        pipeline.seasonal(&request.site_id, &request.reading_parameter, start, end)
    })
    .await
    .map_err(|e| ForecastError::Unclassified(format!("seasonal task failed: {}", e)))??;

    Ok(Json(table.rows))
}

async fn run_forecast(
    state: AppState,
    request: ForecastRequest,
    route: &str,
) -> ApiResult<Json<Vec<OutputRecord>>> {
    request.validate().map_err(ApiError::Validation)?;

    let today = (state.clock)();
    let (start, end) = request.resolve_dates(today);
    log_request(&state, route, &request);

    // The USGS client blocks; keep it off the async workers.
    let pipeline = state.pipeline.clone();
    let series = tokio::task::spawn_blocking(move || {
        pipeline.run(&request.site_id, &request.reading_parameter, start, end, today)
    })
    .await
    .map_err(|e| ForecastError::Unclassified(format!("forecast task failed: {}", e)))??;

    Ok(Json(format_output(Some(&series))))
}

fn log_request(state: &AppState, route: &str, request: &ForecastRequest) {
    state.logger.debug(
        DataSource::Api,
        Some(&request.site_id),
        &format!("{} parameter={}", route, request.reading_parameter),
    );
}

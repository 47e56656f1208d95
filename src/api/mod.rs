//! HTTP surface of the forecast service.
//!
//! Routes:
//! - `GET /`: liveness message
//! - `POST /usgs/forecast`: annual historic + forecast series
//! - `POST /usgs/seasonal`: day-of-year by year comparison table
//! - `GET /forecast`: deprecated query-string form of `/usgs/forecast`

pub mod handlers;
pub mod request;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::error::ForecastError;
use crate::logging::{DataSource, Logger};
use crate::pipeline::ForecastPipeline;

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ForecastPipeline>,
    pub logger: Logger,
    /// Source of "today" for default dates and the current-year window.
    pub clock: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl AppState {
    pub fn new(pipeline: Arc<ForecastPipeline>, logger: Logger) -> Self {
        AppState {
            pipeline,
            logger,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body or query failed schema/field validation (422)
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Pipeline failure, status chosen by its kind
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "Request validation failed",
                        "details": details,
                    }
                }),
            ),
            ApiError::Forecast(err) => (
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                json!({
                    "error": {
                        "code": err.kind().code(),
                        "message": err.to_string(),
                    }
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/usgs/forecast", post(handlers::usgs_forecast))
        .route("/usgs/seasonal", post(handlers::usgs_seasonal))
        .route("/forecast", get(handlers::legacy_forecast))
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(config: &Config, state: AppState) -> std::io::Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    state.logger.info(
        DataSource::System,
        None,
        &format!("Flow Forecast API listening on {} ({})", addr, config.server_url),
    );
    axum::serve(listener, build_router(state)).await
}

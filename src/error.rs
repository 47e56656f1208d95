//! Error taxonomy for the forecast pipeline.
//!
//! Each variant is raised at the point of detection and carries a message
//! with enough context to diagnose without replaying the request.

use std::fmt;
use thiserror::Error;

/// Errors that can arise while fetching, cleaning, or forecasting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Malformed or empty caller input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No usable readings for the requested site/range.
    #[error("No data: {0}")]
    NoData(String),

    /// Too little signal for the model to fit.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Transport failure, non-2xx status, or a body that is not JSON.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Well-formed JSON missing the expected WaterML structure.
    #[error("Upstream contract violation: {0}")]
    UpstreamContractViolation(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Unclassified(String),
}

/// Classification of a `ForecastError`, used for status mapping and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NoData,
    InsufficientData,
    UpstreamUnavailable,
    UpstreamContractViolation,
    Unclassified,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorKind {
    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NoData => "NO_DATA",
            ErrorKind::InsufficientData => "INSUFFICIENT_DATA",
            ErrorKind::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            ErrorKind::UpstreamContractViolation => "UPSTREAM_CONTRACT_VIOLATION",
            ErrorKind::Unclassified => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the kind maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidArgument | ErrorKind::NoData | ErrorKind::InsufficientData => 400,
            ErrorKind::UpstreamUnavailable | ErrorKind::UpstreamContractViolation => 502,
            ErrorKind::Unclassified => 500,
        }
    }
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ForecastError::NoData(_) => ErrorKind::NoData,
            ForecastError::InsufficientData(_) => ErrorKind::InsufficientData,
            ForecastError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            ForecastError::UpstreamContractViolation(_) => ErrorKind::UpstreamContractViolation,
            ForecastError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

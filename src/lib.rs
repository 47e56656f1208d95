pub mod analysis;
pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod output;
pub mod pipeline;

//! Remote data sources.
//!
//! Each upstream service gets its own file here.

pub mod usgs;

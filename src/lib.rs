//! Sensor measurement ingestion, time-bucketed aggregation and charting.

pub mod aggregator;
pub mod api;
pub mod bucket;
pub mod chart;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod series;
pub mod store;
pub mod view;

pub use error::{Error, Result};

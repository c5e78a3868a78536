//! Feature aggregation engine.
//!
//! Turns the operational event history into tabular feature datasets
//! (hourly/daily rollups with lag and rolling-window columns) for demand
//! forecasting and restock planning.
//!
//! Aggregation is a pure function of its inputs: the same events, recipes and
//! parameters always yield the same rows, in ascending bucket order. Buckets
//! referenced by a lag or rolling window that saw no activity contribute zero.

pub mod csv;
pub mod dataset;

mod daily;
mod duration;
mod format;
mod hourly;
mod projection;

pub use dataset::{
    build_dataset, DatasetKind, DatasetParams, ExportError, ExportSources, FeatureRow, FeatureTable,
    UNKNOWN_SUBJECT,
};

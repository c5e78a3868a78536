//! Infrastructure layer: event storage, the buffered metrics writer, catalog
//! read models, the scheduled restock sweep and configuration.

pub mod config;
pub mod event_store;
pub mod metrics;
pub mod read_model;
pub mod restock;

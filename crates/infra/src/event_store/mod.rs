//! Durable, append-only store for operational events.
//!
//! The metrics writer inserts batches; feature exports perform full scans.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryMetricsStore;
pub use postgres::PostgresMetricsStore;
pub use r#trait::{MetricsStore, StoreError};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use cafeops_events::{EventType, MetricEvent};

/// Event store operation error.
///
/// Write failures are transient from the writer's point of view: the batch is
/// re-buffered and retried on the next flush cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("write failed: {0}")]
    Write(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Append-only collection of [`MetricEvent`] records.
///
/// ## Semantics
///
/// - `insert_batch` persists the whole slice or fails; callers may retry the
///   same slice after a failure.
/// - `load_all` returns every stored event in insertion order.
/// - No locking is promised between writers and readers; a scan sees whatever
///   the backend has committed at call time.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn insert_batch(&self, events: &[MetricEvent]) -> Result<(), StoreError>;

    async fn load_all(&self) -> Result<Vec<MetricEvent>, StoreError>;

    /// Full scan restricted to the given event types.
    async fn load_by_types(&self, types: &[EventType]) -> Result<Vec<MetricEvent>, StoreError> {
        let mut events = self.load_all().await?;
        events.retain(|e| types.contains(&e.kind()));
        Ok(events)
    }
}

#[async_trait]
impl<S> MetricsStore for Arc<S>
where
    S: MetricsStore + ?Sized,
{
    async fn insert_batch(&self, events: &[MetricEvent]) -> Result<(), StoreError> {
        (**self).insert_batch(events).await
    }

    async fn load_all(&self) -> Result<Vec<MetricEvent>, StoreError> {
        (**self).load_all().await
    }

    async fn load_by_types(&self, types: &[EventType]) -> Result<Vec<MetricEvent>, StoreError> {
        (**self).load_by_types(types).await
    }
}

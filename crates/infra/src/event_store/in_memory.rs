use std::sync::RwLock;

use async_trait::async_trait;

use cafeops_events::MetricEvent;

use super::r#trait::{MetricsStore, StoreError};

/// In-memory append-only metrics store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryMetricsStore {
    events: RwLock<Vec<MetricEvent>>,
}

impl InMemoryMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetricsStore for InMemoryMetricsStore {
    async fn insert_batch(&self, events: &[MetricEvent]) -> Result<(), StoreError> {
        let mut stored = self
            .events
            .write()
            .map_err(|_| StoreError::Write("lock poisoned".to_string()))?;
        stored.extend_from_slice(events);
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<MetricEvent>, StoreError> {
        let stored = self
            .events
            .read()
            .map_err(|_| StoreError::Read("lock poisoned".to_string()))?;
        Ok(stored.clone())
    }
}

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use cafeops_forecast::{RestockDecision, RunningLowNotifier};
use cafeops_inventory::InventoryItem;

/// "Running low" notification payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningLowAlert {
    pub item: InventoryItem,
    pub decision: RestockDecision,
    pub raised_at: DateTime<Utc>,
}

impl RunningLowAlert {
    fn new(item: &InventoryItem, decision: &RestockDecision) -> Self {
        Self {
            item: item.clone(),
            decision: decision.clone(),
            raised_at: Utc::now(),
        }
    }
}

/// In-memory notifier for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    inner: Mutex<Vec<RunningLowAlert>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<RunningLowAlert> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RunningLowNotifier for InMemoryNotifier {
    fn running_low(&self, item: &InventoryItem, decision: &RestockDecision) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RunningLowAlert::new(item, decision));
    }
}

/// Logs every alert and fans it out to live subscribers.
///
/// Alerts raised while nobody is subscribed are only logged.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<RunningLowAlert>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunningLowAlert> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl RunningLowNotifier for BroadcastNotifier {
    fn running_low(&self, item: &InventoryItem, decision: &RestockDecision) {
        warn!(
            sku = %item.sku,
            item_id = %item.id,
            on_hand = decision.on_hand,
            reorder_point = decision.reorder_point,
            reorder_qty = decision.reorder_qty,
            "inventory running low"
        );
        if self.tx.send(RunningLowAlert::new(item, decision)).is_err() {
            debug!(sku = %item.sku, "no running-low subscribers");
        }
    }
}

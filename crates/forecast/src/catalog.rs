use std::sync::Arc;

use thiserror::Error;

use cafeops_inventory::InventoryItem;

use crate::restock::RestockDecision;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("inventory catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to inventory records.
///
/// The forecasting crate stays storage-agnostic: infra provides the implementation.
pub trait InventoryCatalog: Send + Sync {
    fn find_by_sku(&self, sku: &str) -> Result<Option<InventoryItem>, CatalogError>;

    fn list_items(&self) -> Result<Vec<InventoryItem>, CatalogError>;
}

impl<S> InventoryCatalog for Arc<S>
where
    S: InventoryCatalog + ?Sized,
{
    fn find_by_sku(&self, sku: &str) -> Result<Option<InventoryItem>, CatalogError> {
        (**self).find_by_sku(sku)
    }

    fn list_items(&self) -> Result<Vec<InventoryItem>, CatalogError> {
        (**self).list_items()
    }
}

/// Receiver of "running low" alerts.
///
/// Delivery is best-effort: implementations must not fail the decision.
pub trait RunningLowNotifier: Send + Sync {
    fn running_low(&self, item: &InventoryItem, decision: &RestockDecision);
}

impl<S> RunningLowNotifier for Arc<S>
where
    S: RunningLowNotifier + ?Sized,
{
    fn running_low(&self, item: &InventoryItem, decision: &RestockDecision) {
        (**self).running_low(item, decision)
    }
}

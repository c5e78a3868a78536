use serde::{Deserialize, Serialize};

use cafeops_core::{DomainError, DomainResult};

/// Lead time assumed when an item has none configured.
pub const DEFAULT_LEAD_TIME_DAYS: i64 = 3;

/// Stock-keeping record for one ingredient or supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub sku: String,
    #[serde(default)]
    pub name: String,
    /// On-hand quantity.
    pub quantity: i64,
    pub reorder_threshold: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_stock: Option<i64>,
    /// Target level to refill to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_level: Option<i64>,
    /// Minimum order size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder_quantity: Option<i64>,
}

impl InventoryItem {
    pub fn new(id: impl Into<String>, sku: impl Into<String>, quantity: i64, reorder_threshold: i64) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: String::new(),
            quantity,
            reorder_threshold,
            lead_time_days: None,
            safety_stock: None,
            par_level: None,
            reorder_quantity: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_lead_time_days(mut self, days: i64) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    pub fn with_safety_stock(mut self, units: i64) -> Self {
        self.safety_stock = Some(units);
        self
    }

    pub fn with_par_level(mut self, units: i64) -> Self {
        self.par_level = Some(units);
        self
    }

    pub fn with_reorder_quantity(mut self, units: i64) -> Self {
        self.reorder_quantity = Some(units);
        self
    }

    /// Configured lead time (default 3), never below one day.
    pub fn effective_lead_time_days(&self) -> i64 {
        self.lead_time_days.unwrap_or(DEFAULT_LEAD_TIME_DAYS).max(1)
    }

    /// Safety stock, falling back to the reorder threshold when unset.
    pub fn effective_safety_stock(&self) -> i64 {
        self.safety_stock.unwrap_or(self.reorder_threshold).max(0)
    }

    /// Minimum order size (default 0).
    pub fn reorder_quantity_floor(&self) -> i64 {
        self.reorder_quantity.unwrap_or(0)
    }

    /// Whether the current level is at or below the reorder threshold.
    pub fn is_low(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku must not be blank"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation(format!("{}: quantity must be >= 0", self.sku)));
        }
        if self.reorder_threshold < 0 {
            return Err(DomainError::validation(format!(
                "{}: reorderThreshold must be >= 0",
                self.sku
            )));
        }
        let optional = [
            ("safetyStock", self.safety_stock),
            ("parLevel", self.par_level),
            ("reorderQuantity", self.reorder_quantity),
        ];
        for (field, value) in optional {
            if value.is_some_and(|v| v < 0) {
                return Err(DomainError::validation(format!("{}: {field} must be >= 0", self.sku)));
            }
        }
        Ok(())
    }
}

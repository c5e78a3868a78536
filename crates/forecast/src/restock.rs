//! Reorder point / reorder quantity decisions.
//!
//! Model:
//! - `lead = max(1, leadTimeDays ?? 3)`, `safety = max(0, safetyStock ?? reorderThreshold)`
//! - forecast `clamp(daysAhead ?? lead, 1, 14)` days of demand
//! - `reorderPoint = safety + round(sum of the first `lead` forecast days, negatives as 0)`
//! - restock when `onHand <= reorderPoint`; order up to par level (or the
//!   reorder point), never below the item's minimum order size

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use cafeops_inventory::InventoryItem;

use crate::catalog::{CatalogError, InventoryCatalog, RunningLowNotifier};
use crate::forecast::{forecast_days, predict, predict_or_ramp, Forecast, MAX_RESTOCK_HORIZON_DAYS};
use crate::predictor::{Predictor, PredictorError};

/// Outcome of evaluating one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockDecision {
    pub sku: String,
    pub need_restock: bool,
    pub reorder_qty: i64,
    pub reorder_point: i64,
    pub lead_time_days: i64,
    pub on_hand: i64,
    pub forecast_sum_next_lead_time: i64,
}

#[derive(Debug, Error)]
pub enum RestockError {
    #[error("no inventory item with sku {0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Predictor(#[from] PredictorError),
}

/// Result of a full pass over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub evaluated: usize,
    pub failed: usize,
    pub needs_restock: Vec<RestockDecision>,
}

/// Restock decision engine.
#[derive(Clone, Default)]
pub struct RestockEngine {
    predictor: Option<Arc<dyn Predictor>>,
}

impl core::fmt::Debug for RestockEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestockEngine")
            .field("has_model", &self.has_model())
            .finish()
    }
}

impl RestockEngine {
    pub fn new(predictor: Option<Arc<dyn Predictor>>) -> Self {
        Self { predictor }
    }

    /// Engine with no model: decisions use the synthetic ramp.
    pub fn without_model() -> Self {
        Self::default()
    }

    pub fn has_model(&self) -> bool {
        self.predictor.is_some()
    }

    /// Live model forecast for `days` (clamped to 1..=30).
    ///
    /// Fails with [`PredictorError::Unavailable`] when no model is configured;
    /// there is no synthetic fallback on this path.
    pub fn forecast(&self, item: &InventoryItem, days: i64) -> Result<Forecast, PredictorError> {
        let predictor = self.predictor.as_deref().ok_or(PredictorError::Unavailable)?;
        predict(predictor, item, forecast_days(days))
    }

    /// Pure decision for one item (no notification).
    pub fn evaluate(&self, item: &InventoryItem, days_ahead: Option<i64>) -> Result<RestockDecision, PredictorError> {
        let lead_time_days = item.effective_lead_time_days();
        let safety_stock = item.effective_safety_stock();
        let horizon = days_ahead
            .unwrap_or(lead_time_days)
            .clamp(1, MAX_RESTOCK_HORIZON_DAYS) as usize;

        let forecast = predict_or_ramp(self.predictor.as_deref(), item, horizon)?;
        let demand_over_lead_time = forecast
            .values
            .iter()
            .take(lead_time_days as usize)
            .map(|v| v.max(0.0))
            .sum::<f64>()
            .round() as i64;

        let on_hand = item.quantity;
        // Item records are externally supplied; saturate rather than overflow.
        let reorder_point = safety_stock.saturating_add(demand_over_lead_time);
        let floor = item.reorder_quantity_floor();
        let shortfall = match item.par_level {
            Some(par) => par.saturating_sub(on_hand),
            None => reorder_point.saturating_sub(on_hand),
        };

        Ok(RestockDecision {
            sku: item.sku.clone(),
            need_restock: on_hand <= reorder_point,
            reorder_qty: shortfall.max(floor).max(0),
            reorder_point,
            lead_time_days,
            on_hand,
            forecast_sum_next_lead_time: demand_over_lead_time,
        })
    }

    /// Look up `sku`, decide, and raise a "running low" alert when needed.
    pub fn decide_restock<C, N>(
        &self,
        catalog: &C,
        notifier: &N,
        sku: &str,
        days_ahead: Option<i64>,
    ) -> Result<RestockDecision, RestockError>
    where
        C: InventoryCatalog + ?Sized,
        N: RunningLowNotifier + ?Sized,
    {
        let item = catalog
            .find_by_sku(sku)?
            .ok_or_else(|| RestockError::NotFound(sku.to_string()))?;

        let decision = self.evaluate(&item, days_ahead)?;
        if decision.need_restock {
            notifier.running_low(&item, &decision);
        }
        Ok(decision)
    }

    /// Evaluate every SKU in the catalog, alerting for each one that needs restock.
    ///
    /// A failing item is logged and skipped; only a catalog failure aborts the pass.
    pub fn sweep<C, N>(&self, catalog: &C, notifier: &N) -> Result<SweepReport, RestockError>
    where
        C: InventoryCatalog + ?Sized,
        N: RunningLowNotifier + ?Sized,
    {
        let items = catalog.list_items()?;
        let mut report = SweepReport::default();

        for item in &items {
            report.evaluated += 1;
            match self.evaluate(item, None) {
                Ok(decision) if decision.need_restock => {
                    info!(
                        sku = %item.sku,
                        on_hand = decision.on_hand,
                        reorder_point = decision.reorder_point,
                        reorder_qty = decision.reorder_qty,
                        "item needs restock"
                    );
                    notifier.running_low(item, &decision);
                    report.needs_restock.push(decision);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(sku = %item.sku, error = %e, "restock evaluation failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

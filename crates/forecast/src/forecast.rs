//! Forecast series construction (model-backed or synthetic).

use serde::Serialize;
use tracing::debug;

use cafeops_inventory::InventoryItem;

use crate::predictor::{Predictor, PredictorError};

/// Upper bound of the restock look-ahead.
pub const MAX_RESTOCK_HORIZON_DAYS: i64 = 14;

/// Upper bound of a standalone forecast request.
pub const MAX_FORECAST_DAYS: i64 = 30;

/// Width of the model input vector: `[on_hand, safety_stock, lead_time_days, horizon]`.
const INPUT_WIDTH: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ForecastSource {
    Model,
    /// `[1, 2, ..., horizon]`, used when no model is configured.
    SyntheticRamp,
}

/// Per-day demand estimates, one per future day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub values: Vec<f64>,
    pub source: ForecastSource,
}

/// Deterministic stand-in forecast: `[1, 2, 3, ..., horizon]`.
pub fn synthetic_ramp(horizon: usize) -> Vec<f64> {
    (1..=horizon).map(|d| d as f64).collect()
}

/// Clamp a standalone forecast request to `1..=MAX_FORECAST_DAYS`.
pub fn forecast_days(requested: i64) -> usize {
    requested.clamp(1, MAX_FORECAST_DAYS) as usize
}

fn model_input(item: &InventoryItem, horizon: usize) -> [f32; INPUT_WIDTH] {
    [
        item.quantity as f32,
        item.effective_safety_stock() as f32,
        item.effective_lead_time_days() as f32,
        horizon as f32,
    ]
}

/// Ask the model for `horizon` days of demand for `item`.
///
/// Output is truncated or zero-padded to `horizon`; non-finite values become 0.
pub(crate) fn predict(
    predictor: &dyn Predictor,
    item: &InventoryItem,
    horizon: usize,
) -> Result<Forecast, PredictorError> {
    let (input_name, output_name) = predictor.io_names();
    let input = model_input(item, horizon);
    let raw = predictor.predict_float(&input, &[1, INPUT_WIDTH], &input_name, &output_name)?;

    let mut values: Vec<f64> = raw
        .into_iter()
        .take(horizon)
        .map(|v| if v.is_finite() { f64::from(v) } else { 0.0 })
        .collect();
    values.resize(horizon, 0.0);

    debug!(sku = %item.sku, horizon, "model forecast produced");
    Ok(Forecast {
        values,
        source: ForecastSource::Model,
    })
}

/// Model forecast when available, otherwise the documented synthetic ramp.
pub(crate) fn predict_or_ramp(
    predictor: Option<&dyn Predictor>,
    item: &InventoryItem,
    horizon: usize,
) -> Result<Forecast, PredictorError> {
    match predictor {
        Some(p) => predict(p, item, horizon),
        None => {
            debug!(sku = %item.sku, horizon, "no forecasting model; substituting synthetic ramp");
            Ok(Forecast {
                values: synthetic_ramp(horizon),
                source: ForecastSource::SyntheticRamp,
            })
        }
    }
}

//! `cafeops-forecast`
//!
//! **Responsibility:** demand forecasting boundary and restock decisions.
//!
//! - The model runtime is opaque: anything implementing [`Predictor`] can back
//!   forecasts (an ONNX/CoreML binding, a fixed series for development, ...).
//! - Without a predictor, restock decisions use an explicit synthetic ramp;
//!   callers that require a live forecast get [`PredictorError::Unavailable`].
//! - Decisions never mutate inventory; "running low" alerts are delegated to a
//!   [`RunningLowNotifier`].

pub mod catalog;
pub mod forecast;
pub mod predictor;
pub mod restock;

pub use catalog::{CatalogError, InventoryCatalog, RunningLowNotifier};
pub use forecast::{
    forecast_days, synthetic_ramp, Forecast, ForecastSource, MAX_FORECAST_DAYS, MAX_RESTOCK_HORIZON_DAYS,
};
pub use predictor::{load_predictor, FixedSeriesPredictor, Predictor, PredictorError};
pub use restock::{RestockDecision, RestockEngine, RestockError, SweepReport};

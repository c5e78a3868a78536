use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;

use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": services.engine.has_model(),
        "writer": services.writer.stats(),
    }))
}

/// Force a flush of buffered metrics (skipped if one is already running).
pub async fn flush_metrics(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.writer.flush().await)
}

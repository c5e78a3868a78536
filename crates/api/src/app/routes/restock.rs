use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use cafeops_forecast::InventoryCatalog;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /restock/decision`
pub async fn decide(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RestockDecisionRequest>,
) -> Response {
    match services.engine.decide_restock(
        &*services.catalog,
        &*services.notifier,
        &body.sku,
        body.days_ahead,
    ) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(e) => errors::restock_error_to_response(e),
    }
}

/// `POST /restock/sweep` runs one pass over every SKU now.
pub async fn sweep(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.engine.sweep(&*services.catalog, &*services.notifier) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::restock_error_to_response(e),
    }
}

/// `GET /forecast/:sku?days=` requires a live model; `days` is clamped to 1..=30.
pub async fn forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sku): Path<String>,
    Query(query): Query<dto::ForecastQuery>,
) -> Response {
    let item = match services.catalog.find_by_sku(&sku) {
        Ok(Some(item)) => item,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no inventory item with sku {sku}"),
            );
        }
        Err(e) => return errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "catalog_unavailable", e.to_string()),
    };

    match services.engine.forecast(&item, query.days.unwrap_or(7)) {
        Ok(forecast) => Json(json!({
            "sku": item.sku,
            "days": forecast.values.len(),
            "forecast": forecast.values,
        }))
        .into_response(),
        Err(e) => errors::predictor_error_to_response(e),
    }
}

/// `GET /restock/alerts`: server-sent "running low" alerts.
pub async fn alerts_stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.notifier.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(alert) => SseEvent::default()
            .event("running_low")
            .json_data(&alert)
            .ok()
            .map(Ok),
        // Lagged receivers skip missed alerts.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

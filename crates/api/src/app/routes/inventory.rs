use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use cafeops_inventory::InventoryItem;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `PUT /inventory/items/:sku` stores the item and records its level
/// (plus a low-stock event at or below threshold).
pub async fn upsert_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sku): Path<String>,
    Json(body): Json<dto::UpsertItemRequest>,
) -> Response {
    let item = InventoryItem {
        id: body.id,
        sku,
        name: body.name,
        quantity: body.quantity,
        reorder_threshold: body.reorder_threshold,
        lead_time_days: body.lead_time_days,
        safety_stock: body.safety_stock,
        par_level: body.par_level,
        reorder_quantity: body.reorder_quantity,
    };

    if let Err(e) = services.catalog.upsert_item(item.clone()) {
        return errors::domain_error_to_response(e);
    }
    services.recorder.record_inventory_snapshot(&item);

    (StatusCode::OK, Json(item)).into_response()
}

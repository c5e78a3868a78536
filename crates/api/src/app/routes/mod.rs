use axum::{
    routing::{get, post, put},
    Router,
};

pub mod exports;
pub mod inventory;
pub mod restock;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .route("/exports/:kind", get(exports::export_dataset))
        .route("/restock/decision", post(restock::decide))
        .route("/restock/sweep", post(restock::sweep))
        .route("/restock/alerts", get(restock::alerts_stream))
        .route("/forecast/:sku", get(restock::forecast))
        .route("/inventory/items/:sku", put(inventory::upsert_item))
        .route("/metrics/flush", post(system::flush_metrics))
}

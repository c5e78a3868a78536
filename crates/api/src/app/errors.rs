use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cafeops_core::DomainError;
use cafeops_features::ExportError;
use cafeops_forecast::{PredictorError, RestockError};
use cafeops_infra::event_store::StoreError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
    }
}

pub fn restock_error_to_response(err: RestockError) -> axum::response::Response {
    match err {
        RestockError::NotFound(sku) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no inventory item with sku {sku}"),
        ),
        RestockError::Catalog(e) => json_error(StatusCode::SERVICE_UNAVAILABLE, "catalog_unavailable", e.to_string()),
        RestockError::Predictor(e) => predictor_error_to_response(e),
    }
}

pub fn predictor_error_to_response(err: PredictorError) -> axum::response::Response {
    match err {
        PredictorError::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "dependency_failed",
            "no forecasting model is configured",
        ),
        other => json_error(StatusCode::BAD_GATEWAY, "prediction_failed", other.to_string()),
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    match err {
        ExportError::InvalidKind(kind) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_kind",
            format!("unknown dataset kind: {kind}"),
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path, Query},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use cafeops_features::{build_dataset, DatasetKind, ExportSources};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub const SUBJECT_HEADER: &str = "x-dataset-subject";

/// `GET /exports/:kind` streams a CSV feature dataset.
///
/// No data yields a header-only CSV, never an error.
pub async fn export_dataset(
    Extension(services): Extension<Arc<AppServices>>,
    Path(kind): Path<String>,
    Query(query): Query<dto::ExportQuery>,
) -> Response {
    let kind: DatasetKind = match kind.parse() {
        Ok(k) => k,
        Err(e) => return errors::export_error_to_response(e),
    };

    let types = kind.source_event_types();
    let events = if types.is_empty() {
        Vec::new()
    } else {
        match services.store.load_by_types(types).await {
            Ok(events) => events,
            Err(e) => return errors::store_error_to_response(e),
        }
    };

    let sources = ExportSources::from_events(events)
        .with_recipes(services.catalog.recipes())
        .with_reservations(services.catalog.reservations());
    let table = build_dataset(kind, query.into(), sources);

    let filename = table.filename();
    let subject = table.subject().map(str::to_string);
    tracing::info!(kind = %kind, subject = ?subject, "exporting dataset");

    let lines = table.into_csv_lines().map(Ok::<_, Infallible>);
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        Body::from_stream(tokio_stream::iter(lines)),
    )
        .into_response();

    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    if let Some(v) = subject.and_then(|s| HeaderValue::from_str(&s).ok()) {
        headers.insert(SUBJECT_HEADER, v);
    }
    response
}

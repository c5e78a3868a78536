use serde::Deserialize;

use cafeops_features::DatasetParams;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockDecisionRequest {
    pub sku: String,
    pub days_ahead: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub menu_item_id: Option<String>,
    pub sku: Option<String>,
}

impl From<ExportQuery> for DatasetParams {
    fn from(q: ExportQuery) -> Self {
        DatasetParams {
            menu_item_id: q.menu_item_id,
            sku: q.sku,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertItemRequest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub lead_time_days: Option<i64>,
    pub safety_stock: Option<i64>,
    pub par_level: Option<i64>,
    pub reorder_quantity: Option<i64>,
}

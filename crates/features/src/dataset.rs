//! Dataset kinds, parameters and the lazily-rendered feature table.

use core::str::FromStr;

use thiserror::Error;
use tracing::debug;

use cafeops_events::{EventType, MetricEvent};
use cafeops_inventory::{Recipe, Reservation};

use crate::csv::render_line;
use crate::{daily, duration, hourly, projection};

/// Subject reported by `restockdaily` when there is no demand data at all.
pub const UNKNOWN_SUBJECT: &str = "UNKNOWN";

/// One emitted CSV record (already formatted).
pub type FeatureRow = Vec<String>;

pub(crate) type Rows = Box<dyn Iterator<Item = FeatureRow> + Send>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("unknown dataset kind: {0}")]
    InvalidKind(String),
}

/// Feature dataset selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Raw,
    OrderCompleted,
    OrderItemDemand,
    DemandHourly,
    WorkloadHourly,
    ReservationsHourly,
    RestockDaily,
    IngredientDaily,
    ReservationDuration,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 9] = [
        DatasetKind::Raw,
        DatasetKind::OrderCompleted,
        DatasetKind::OrderItemDemand,
        DatasetKind::DemandHourly,
        DatasetKind::WorkloadHourly,
        DatasetKind::ReservationsHourly,
        DatasetKind::RestockDaily,
        DatasetKind::IngredientDaily,
        DatasetKind::ReservationDuration,
    ];

    /// Path-segment name (e.g. `workloadhourly`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Raw => "raw",
            DatasetKind::OrderCompleted => "ordercompleted",
            DatasetKind::OrderItemDemand => "orderitemdemand",
            DatasetKind::DemandHourly => "demandhourly",
            DatasetKind::WorkloadHourly => "workloadhourly",
            DatasetKind::ReservationsHourly => "reservationshourly",
            DatasetKind::RestockDaily => "restockdaily",
            DatasetKind::IngredientDaily => "ingredientdaily",
            DatasetKind::ReservationDuration => "reservationduration",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Raw => projection::RAW_HEADER,
            DatasetKind::OrderCompleted => projection::ORDER_COMPLETED_HEADER,
            DatasetKind::OrderItemDemand => projection::ORDER_ITEM_DEMAND_HEADER,
            DatasetKind::DemandHourly => hourly::DEMAND_HEADER,
            DatasetKind::WorkloadHourly => hourly::WORKLOAD_HEADER,
            DatasetKind::ReservationsHourly => hourly::RESERVATIONS_HEADER,
            DatasetKind::RestockDaily => daily::RESTOCK_HEADER,
            DatasetKind::IngredientDaily => daily::INGREDIENT_HEADER,
            DatasetKind::ReservationDuration => duration::DURATION_HEADER,
        }
    }

    /// Event types the builder reads; lets the store filter its scan.
    ///
    /// The hourly kinds observe buckets from every event type.
    pub fn source_event_types(&self) -> &'static [EventType] {
        match self {
            DatasetKind::Raw | DatasetKind::WorkloadHourly | DatasetKind::ReservationsHourly => &EventType::ALL,
            DatasetKind::OrderCompleted => &[EventType::OrderCompleted],
            DatasetKind::OrderItemDemand
            | DatasetKind::DemandHourly
            | DatasetKind::RestockDaily
            | DatasetKind::IngredientDaily => &[EventType::OrderItemDemand],
            DatasetKind::ReservationDuration => &[],
        }
    }
}

impl core::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ExportError;

    /// Case-insensitive; `-` and `_` are ignored (`workload-hourly` works).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        DatasetKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ExportError::InvalidKind(s.to_string()))
    }
}

/// Kind-specific optional parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetParams {
    /// Menu item for `restockdaily`; defaults to the best seller.
    pub menu_item_id: Option<String>,
    /// Ingredient for `ingredientdaily`; defaults to every observed SKU.
    pub sku: Option<String>,
}

impl DatasetParams {
    pub fn with_menu_item(mut self, menu_item_id: impl Into<String>) -> Self {
        self.menu_item_id = Some(menu_item_id.into());
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Blank strings count as "not given".
    fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            menu_item_id: keep(self.menu_item_id),
            sku: keep(self.sku),
        }
    }
}

/// Everything an export may read, taken by value so rows can be produced lazily.
#[derive(Debug, Clone, Default)]
pub struct ExportSources {
    pub events: Vec<MetricEvent>,
    pub recipes: Vec<Recipe>,
    pub reservations: Vec<Reservation>,
}

impl ExportSources {
    pub fn from_events(events: Vec<MetricEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn with_recipes(mut self, recipes: Vec<Recipe>) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn with_reservations(mut self, reservations: Vec<Reservation>) -> Self {
        self.reservations = reservations;
        self
    }
}

/// A feature dataset ready to stream: fixed header plus lazily formatted rows.
pub struct FeatureTable {
    kind: DatasetKind,
    subject: Option<String>,
    rows: Rows,
}

impl core::fmt::Debug for FeatureTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeatureTable")
            .field("kind", &self.kind)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl FeatureTable {
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn header(&self) -> &'static [&'static str] {
        self.kind.header()
    }

    /// The menu item (restockdaily) or SKU (ingredientdaily) the rows are about.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Download filename for this table.
    pub fn filename(&self) -> String {
        match (self.kind, self.subject.as_deref()) {
            (DatasetKind::Raw, _) => "raw_events.csv".to_string(),
            (DatasetKind::OrderCompleted, _) => "order_completed.csv".to_string(),
            (DatasetKind::OrderItemDemand, _) => "order_item_demand.csv".to_string(),
            (DatasetKind::DemandHourly, _) => "demand_hourly.csv".to_string(),
            (DatasetKind::WorkloadHourly, _) => "workload_hourly.csv".to_string(),
            (DatasetKind::ReservationsHourly, _) => "reservations_hourly.csv".to_string(),
            (DatasetKind::RestockDaily, Some(item)) if item != UNKNOWN_SUBJECT => {
                format!("inv_{}_daily.csv", filename_safe(item))
            }
            (DatasetKind::RestockDaily, _) => "restock_daily.csv".to_string(),
            (DatasetKind::IngredientDaily, Some(sku)) => {
                format!("ingredient_{}_daily.csv", filename_safe(sku))
            }
            (DatasetKind::IngredientDaily, None) => "ingredient_all_daily.csv".to_string(),
            (DatasetKind::ReservationDuration, _) => "reservation_duration.csv".to_string(),
        }
    }

    /// Formatted data rows (header excluded), in ascending bucket order.
    pub fn rows(self) -> impl Iterator<Item = FeatureRow> + Send {
        self.rows
    }

    /// Header line followed by one line per row, each terminated by `\n`.
    pub fn into_csv_lines(self) -> impl Iterator<Item = String> + Send {
        let header = render_line(self.kind.header());
        std::iter::once(header).chain(self.rows.map(|row| render_line(&row)))
    }

    /// Materialize the whole CSV document.
    pub fn to_csv(self) -> String {
        self.into_csv_lines().collect()
    }
}

fn filename_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Build a feature dataset.
///
/// Bucket accumulation needs one full pass over the events up front; row
/// formatting happens lazily as the returned table is consumed.
pub fn build_dataset(kind: DatasetKind, params: DatasetParams, sources: ExportSources) -> FeatureTable {
    let params = params.normalized();
    let ExportSources {
        mut events,
        recipes,
        reservations,
    } = sources;

    // Stable: events with equal timestamps keep their stored order.
    events.sort_by_key(|e| e.timestamp());

    debug!(kind = %kind, events = events.len(), "building feature dataset");

    let (subject, rows) = match kind {
        DatasetKind::Raw => (None, projection::raw_rows(events)),
        DatasetKind::OrderCompleted => (None, projection::order_completed_rows(events)),
        DatasetKind::OrderItemDemand => (None, projection::order_item_demand_rows(events)),
        DatasetKind::DemandHourly => (None, hourly::demand_rows(&events)),
        DatasetKind::WorkloadHourly => (None, hourly::workload_rows(&events)),
        DatasetKind::ReservationsHourly => (None, hourly::reservation_rows(&events)),
        DatasetKind::RestockDaily => {
            let (subject, rows) = daily::restock_rows(&events, params.menu_item_id.as_deref());
            (Some(subject), rows)
        }
        DatasetKind::IngredientDaily => {
            let rows = daily::ingredient_rows(&events, &recipes, params.sku.as_deref());
            (params.sku, rows)
        }
        DatasetKind::ReservationDuration => (None, duration::duration_rows(reservations)),
    };

    FeatureTable { kind, subject, rows }
}

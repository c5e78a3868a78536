//! Day-bucketed datasets: menu-item restock demand and ingredient usage.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use cafeops_core::DayBucket;
use cafeops_events::{EventPayload, MetricEvent};
use cafeops_inventory::Recipe;

use crate::dataset::{FeatureRow, Rows, UNKNOWN_SUBJECT};
use crate::format::{daily_calendar, f4, mean};

pub(crate) const RESTOCK_HEADER: &[&str] = &[
    "year",
    "month",
    "day",
    "weekday",
    "isWeekend",
    "lag1dOrders",
    "lag1dItems",
    "lag1dQty",
    "lag7dQty",
    "lag28dQty",
    "rolling7dAvgQty",
    "targetQty",
];

pub(crate) const INGREDIENT_HEADER: &[&str] = &[
    "sku",
    "year",
    "month",
    "day",
    "weekday",
    "isWeekend",
    "lag1dUsage",
    "lag7dUsage",
    "lag28dUsage",
    "rolling7dAvgUsage",
    "targetUsage",
];

/// Daily demand per menu item plus day-level context across all items.
#[derive(Debug, Default)]
struct DemandHistory {
    per_item: BTreeMap<String, BTreeMap<DayBucket, i64>>,
    day_orders: BTreeMap<DayBucket, BTreeSet<String>>,
    day_items: BTreeMap<DayBucket, i64>,
}

impl DemandHistory {
    fn collect(events: &[MetricEvent]) -> Self {
        let mut history = Self::default();
        for event in events {
            if let EventPayload::OrderItemDemand {
                order_id,
                menu_item_id,
                quantity,
                ..
            } = event.payload()
            {
                let day = DayBucket::of(&event.timestamp());
                *history
                    .per_item
                    .entry(menu_item_id.clone())
                    .or_default()
                    .entry(day)
                    .or_default() += quantity;
                history.day_orders.entry(day).or_default().insert(order_id.clone());
                *history.day_items.entry(day).or_default() += quantity;
            }
        }
        history
    }

    /// Menu item with the largest total quantity; ties go to the smallest id.
    fn best_seller(&self) -> Option<&str> {
        let mut best: Option<(&str, i64)> = None;
        for (item, days) in &self.per_item {
            let total: i64 = days.values().sum();
            if best.is_none_or(|(_, top)| total > top) {
                best = Some((item.as_str(), total));
            }
        }
        best.map(|(item, _)| item)
    }
}

/// Rows for one menu item; returns the item the rows describe.
///
/// With no demand data at all the subject is [`UNKNOWN_SUBJECT`] and no rows
/// are produced.
pub(crate) fn restock_rows(events: &[MetricEvent], menu_item_id: Option<&str>) -> (String, Rows) {
    let history = DemandHistory::collect(events);
    if history.per_item.is_empty() {
        return (UNKNOWN_SUBJECT.to_string(), Box::new(std::iter::empty()));
    }

    let selected = match menu_item_id {
        Some(id) => id.to_string(),
        None => history.best_seller().unwrap_or(UNKNOWN_SUBJECT).to_string(),
    };

    let DemandHistory {
        mut per_item,
        day_orders,
        day_items,
    } = history;
    let item_days = per_item.remove(&selected).unwrap_or_default();
    let days: Vec<DayBucket> = item_days.keys().copied().collect();

    let rows = days.into_iter().map(move |day| {
        let qty_at = |d: DayBucket| item_days.get(&d).copied().unwrap_or(0) as f64;
        let prev_7d: Vec<f64> = (1..=7).map(|k| qty_at(day.back(k))).collect();
        let yesterday = day.back(1);

        let mut row = daily_calendar(&day.calendar());
        row.extend([
            f4(day_orders.get(&yesterday).map_or(0, |o| o.len()) as f64),
            f4(day_items.get(&yesterday).copied().unwrap_or(0) as f64),
            f4(qty_at(day.back(1))),
            f4(qty_at(day.back(7))),
            f4(qty_at(day.back(28))),
            f4(mean(&prev_7d)),
        ]);
        row.push(item_days.get(&day).copied().unwrap_or(0).to_string());
        row
    });

    (selected, Box::new(rows))
}

/// Ingredient usage per SKU and day, derived through recipes.
fn ingredient_usage(events: &[MetricEvent], recipes: &[Recipe]) -> BTreeMap<String, BTreeMap<DayBucket, f64>> {
    let by_menu_item: HashMap<&str, &Recipe> = recipes
        .iter()
        .map(|r| (r.menu_item_id.as_str(), r))
        .collect();

    let mut usage: BTreeMap<String, BTreeMap<DayBucket, f64>> = BTreeMap::new();
    for event in events {
        let EventPayload::OrderItemDemand {
            menu_item_id,
            quantity,
            ..
        } = event.payload()
        else {
            continue;
        };
        let Some(recipe) = by_menu_item.get(menu_item_id.as_str()) else {
            continue;
        };
        let day = DayBucket::of(&event.timestamp());
        for component in &recipe.components {
            *usage
                .entry(component.sku.clone())
                .or_default()
                .entry(day)
                .or_default() += component.usage_for(*quantity as f64);
        }
    }
    usage
}

/// Rows for one SKU, or for every observed SKU (grouped by SKU) when `sku` is `None`.
pub(crate) fn ingredient_rows(events: &[MetricEvent], recipes: &[Recipe], sku: Option<&str>) -> Rows {
    let mut usage = ingredient_usage(events, recipes);
    if let Some(sku) = sku {
        usage.retain(|k, _| k == sku);
    }

    Box::new(usage.into_iter().flat_map(|(sku, days)| {
        let keys: Vec<DayBucket> = days.keys().copied().collect();
        keys.into_iter()
            .map(move |day| ingredient_row(&sku, &days, day))
    }))
}

fn ingredient_row(sku: &str, days: &BTreeMap<DayBucket, f64>, day: DayBucket) -> FeatureRow {
    let used_at = |d: DayBucket| days.get(&d).copied().unwrap_or(0.0);
    let prev_7d: Vec<f64> = (1..=7).map(|k| used_at(day.back(k))).collect();

    let mut row = vec![sku.to_string()];
    row.extend(daily_calendar(&day.calendar()));
    row.extend([
        f4(used_at(day.back(1))),
        f4(used_at(day.back(7))),
        f4(used_at(day.back(28))),
        f4(mean(&prev_7d)),
        f4(used_at(day)),
    ]);
    row
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use cafeops_events::{Channel, ServiceType};
    use cafeops_inventory::RecipeComponent;

    use crate::{build_dataset, DatasetKind, DatasetParams, ExportSources};

    use super::*;

    fn day0() -> DateTime<Utc> {
        // Friday 2024-03-01
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn demand(ts: DateTime<Utc>, order_id: &str, item: &str, quantity: i64) -> MetricEvent {
        MetricEvent::new(
            ts,
            EventPayload::OrderItemDemand {
                order_id: order_id.into(),
                menu_item_id: item.into(),
                channel: Channel::Takeaway,
                service_type: ServiceType::Barista,
                quantity,
            },
        )
    }

    fn col(kind: DatasetKind, name: &str) -> usize {
        kind.header().iter().position(|h| *h == name).unwrap()
    }

    #[test]
    fn restock_daily_selects_best_seller_without_parameter() {
        let events = vec![
            demand(day0(), "a", "latte", 2),
            demand(day0(), "a", "mocha", 1),
            demand(day0() + Duration::days(1), "b", "latte", 4),
            demand(day0() + Duration::days(1), "c", "mocha", 3),
        ];

        let table = build_dataset(
            DatasetKind::RestockDaily,
            DatasetParams::default(),
            ExportSources::from_events(events),
        );
        assert_eq!(table.subject(), Some("latte"));
        assert_eq!(table.filename(), "inv_latte_daily.csv");

        let k = DatasetKind::RestockDaily;
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][col(k, "lag1dQty")], "0.0000");
        assert_eq!(rows[0][col(k, "targetQty")], "2");
        assert_eq!(rows[1][col(k, "lag1dOrders")], "1.0000");
        assert_eq!(rows[1][col(k, "lag1dItems")], "3.0000");
        assert_eq!(rows[1][col(k, "lag1dQty")], "2.0000");
        assert_eq!(rows[1][col(k, "rolling7dAvgQty")], f4(2.0 / 7.0));
        assert_eq!(rows[1][col(k, "targetQty")], "4");
        // 2024-03-02 is a Saturday.
        assert_eq!(rows[1][col(k, "isWeekend")], "true");
    }

    #[test]
    fn restock_daily_honours_explicit_item_and_long_lags() {
        let events = vec![
            demand(day0(), "a", "mocha", 5),
            demand(day0() + Duration::days(7), "b", "mocha", 1),
            demand(day0() + Duration::days(28), "c", "mocha", 2),
            demand(day0(), "d", "latte", 50),
        ];
        let table = build_dataset(
            DatasetKind::RestockDaily,
            DatasetParams::default().with_menu_item("mocha"),
            ExportSources::from_events(events),
        );
        assert_eq!(table.subject(), Some("mocha"));

        let k = DatasetKind::RestockDaily;
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][col(k, "lag7dQty")], "5.0000");
        assert_eq!(rows[2][col(k, "lag28dQty")], "5.0000");
        assert_eq!(rows[2][col(k, "lag7dQty")], "0.0000");
    }

    #[test]
    fn restock_daily_without_data_is_unknown_placeholder() {
        let table = build_dataset(
            DatasetKind::RestockDaily,
            DatasetParams::default(),
            ExportSources::default(),
        );
        assert_eq!(table.subject(), Some(UNKNOWN_SUBJECT));
        assert_eq!(table.filename(), "restock_daily.csv");
        assert_eq!(table.to_csv(), format!("{}\n", RESTOCK_HEADER.join(",")));
    }

    #[test]
    fn ingredient_usage_applies_units_and_wastage() {
        let recipes = vec![Recipe::new(
            "latte",
            vec![
                RecipeComponent::new("BEANS", 0.018).with_wastage_rate(0.02),
                RecipeComponent::new("MILK", 0.2),
            ],
        )];
        let events = vec![demand(day0(), "a", "latte", 3)];

        let usage = ingredient_usage(&events, &recipes);
        let beans = usage["BEANS"][&DayBucket::of(&day0())];
        assert!((beans - 0.05508).abs() < 1e-12);

        let rows: Vec<_> = build_dataset(
            DatasetKind::IngredientDaily,
            DatasetParams::default(),
            ExportSources::from_events(events).with_recipes(recipes),
        )
        .rows()
        .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "BEANS");
        assert_eq!(rows[0][col(DatasetKind::IngredientDaily, "targetUsage")], "0.0551");
        assert_eq!(rows[1][0], "MILK");
        assert_eq!(rows[1][col(DatasetKind::IngredientDaily, "targetUsage")], "0.6000");
    }

    #[test]
    fn ingredient_filter_keeps_one_sku_in_day_order() {
        let recipes = vec![Recipe::new("latte", vec![RecipeComponent::new("MILK", 0.25)])];
        let events = vec![
            demand(day0() + Duration::days(1), "b", "latte", 2),
            demand(day0(), "a", "latte", 4),
            demand(day0(), "x", "unknown-item", 9),
        ];
        let rows: Vec<_> = build_dataset(
            DatasetKind::IngredientDaily,
            DatasetParams::default().with_sku("MILK"),
            ExportSources::from_events(events).with_recipes(recipes),
        )
        .rows()
        .collect();

        let k = DatasetKind::IngredientDaily;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][col(k, "day")], "1");
        assert_eq!(rows[0][col(k, "targetUsage")], "1.0000");
        assert_eq!(rows[1][col(k, "lag1dUsage")], "1.0000");
        assert_eq!(rows[1][col(k, "targetUsage")], "0.5000");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            .. ProptestConfig::default()
        })]

        #[test]
        fn restock_daily_lags_are_zero_filled(offsets in prop::collection::vec((0i64..60, 1i64..6), 1..40)) {
            let events: Vec<_> = offsets
                .iter()
                .enumerate()
                .map(|(i, (d, q))| demand(day0() + Duration::days(*d), &format!("o{i}"), "latte", *q))
                .collect();
            let mut per_day: BTreeMap<i64, i64> = BTreeMap::new();
            for (d, q) in &offsets {
                *per_day.entry(*d).or_default() += q;
            }

            let k = DatasetKind::RestockDaily;
            let rows: Vec<_> = build_dataset(k, DatasetParams::default(), ExportSources::from_events(events))
                .rows()
                .collect();
            prop_assert_eq!(rows.len(), per_day.len());

            for (row, (d, q)) in rows.iter().zip(per_day.iter()) {
                let at = |o: i64| per_day.get(&(d - o)).copied().unwrap_or(0) as f64;
                prop_assert_eq!(row[col(k, "targetQty")].clone(), q.to_string());
                prop_assert_eq!(row[col(k, "lag1dQty")].clone(), f4(at(1)));
                prop_assert_eq!(row[col(k, "lag7dQty")].clone(), f4(at(7)));
                prop_assert_eq!(row[col(k, "lag28dQty")].clone(), f4(at(28)));
            }
        }
    }
}

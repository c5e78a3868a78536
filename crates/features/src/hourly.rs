//! Hour-bucketed datasets: demand, workload and reservations.
//!
//! Every lag/rolling column of an hourly row is computed from earlier buckets
//! only; the current bucket feeds nothing but the target column.

use std::collections::{BTreeMap, BTreeSet};

use cafeops_core::HourBucket;
use cafeops_events::{Channel, EventPayload, MetricEvent, ServiceType};

use crate::dataset::{FeatureRow, Rows};
use crate::format::{event_calendar, f4, hourly_calendar, mean};

pub(crate) const DEMAND_HEADER: &[&str] = &[
    "menuItemId",
    "year",
    "month",
    "day",
    "hour",
    "weekday",
    "quantity",
];

pub(crate) const WORKLOAD_HEADER: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "weekday",
    "isWeekend",
    "lag1hOrders",
    "lag24hOrders",
    "rolling3hAvgOrders",
    "rolling7dSameHourAvgOrders",
    "lag1hItems",
    "lag1hDistinctOrders",
    "lag1hAvgItemsPerOrder",
    "lag1hDineIn",
    "lag1hTakeaway",
    "lag1hPickup",
    "lag1hDelivery",
    "lag1hBarista",
    "lag1hKitchen",
    "lag1hBakery",
    "targetOrders",
];

pub(crate) const RESERVATIONS_HEADER: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "weekday",
    "isWeekend",
    "lag1hReservations",
    "lag24hReservations",
    "rolling3hAvgReservations",
    "rolling7dSameHourAvgReservations",
    "targetReservations",
];

/// Summed `orderItemDemand` quantity per (hour, menu item).
pub(crate) fn demand_rows(events: &[MetricEvent]) -> Rows {
    let mut groups: BTreeMap<(HourBucket, String), i64> = BTreeMap::new();
    for event in events {
        if let EventPayload::OrderItemDemand {
            menu_item_id,
            quantity,
            ..
        } = event.payload()
        {
            *groups
                .entry((HourBucket::of(&event.timestamp()), menu_item_id.clone()))
                .or_default() += quantity;
        }
    }

    Box::new(groups.into_iter().map(|((hour, menu_item_id), quantity)| {
        let mut row = vec![menu_item_id];
        row.extend(event_calendar(&hour.calendar()));
        row.push(quantity.to_string());
        row
    }))
}

/// Order activity observed within one hour.
#[derive(Debug, Default, Clone)]
struct HourStats {
    orders: u64,
    order_ids: BTreeSet<String>,
    items: i64,
    channels: [u64; 4],
    services: [u64; 3],
}

impl HourStats {
    fn avg_items_per_order(&self) -> f64 {
        if self.order_ids.is_empty() {
            0.0
        } else {
            self.items as f64 / self.order_ids.len() as f64
        }
    }
}

fn channel_slot(channel: Channel) -> usize {
    match channel {
        Channel::DineIn => 0,
        Channel::Takeaway => 1,
        Channel::Pickup => 2,
        Channel::Delivery => 3,
    }
}

fn service_slot(service_type: ServiceType) -> usize {
    match service_type {
        ServiceType::Barista => 0,
        ServiceType::Kitchen => 1,
        ServiceType::Bakery => 2,
    }
}

pub(crate) fn workload_rows(events: &[MetricEvent]) -> Rows {
    let mut stats: BTreeMap<HourBucket, HourStats> = BTreeMap::new();
    let mut observed: BTreeSet<HourBucket> = BTreeSet::new();

    for event in events {
        let hour = HourBucket::of(&event.timestamp());
        observed.insert(hour);

        match event.payload() {
            EventPayload::OrderCreated {
                order_id,
                channel,
                service_type,
            } => {
                let s = stats.entry(hour).or_default();
                s.orders += 1;
                s.order_ids.insert(order_id.clone());
                s.channels[channel_slot(*channel)] += 1;
                s.services[service_slot(*service_type)] += 1;
            }
            EventPayload::OrderItemDemand {
                order_id, quantity, ..
            } => {
                let s = stats.entry(hour).or_default();
                s.items += quantity;
                s.order_ids.insert(order_id.clone());
            }
            EventPayload::OrderCompleted { .. }
            | EventPayload::OrderCanceled { .. }
            | EventPayload::InventoryLevel { .. }
            | EventPayload::InventoryLow { .. }
            | EventPayload::ReservationCreated { .. }
            | EventPayload::MenuItemUpdated { .. }
            | EventPayload::MenuItemAvailability { .. } => {}
        }
    }

    Box::new(observed.into_iter().map(move |hour| workload_row(&stats, hour)))
}

fn workload_row(stats: &BTreeMap<HourBucket, HourStats>, hour: HourBucket) -> FeatureRow {
    let empty = HourStats::default();
    let orders_at = |h: HourBucket| stats.get(&h).map_or(0.0, |s| s.orders as f64);

    let lag1 = stats.get(&hour.back(1)).unwrap_or(&empty);
    let prev_3h: Vec<f64> = (1..=3).map(|k| orders_at(hour.back(k))).collect();
    let same_hour_7d: Vec<f64> = (1..=7).map(|k| orders_at(hour.back(24 * k))).collect();
    let target = stats.get(&hour).map_or(0, |s| s.orders);

    let mut row = hourly_calendar(&hour.calendar());
    row.extend([
        f4(lag1.orders as f64),
        f4(orders_at(hour.back(24))),
        f4(mean(&prev_3h)),
        f4(mean(&same_hour_7d)),
        f4(lag1.items as f64),
        f4(lag1.order_ids.len() as f64),
        f4(lag1.avg_items_per_order()),
    ]);
    row.extend(lag1.channels.iter().map(|&n| f4(n as f64)));
    row.extend(lag1.services.iter().map(|&n| f4(n as f64)));
    row.push(target.to_string());
    row
}

pub(crate) fn reservation_rows(events: &[MetricEvent]) -> Rows {
    let mut counts: BTreeMap<HourBucket, u64> = BTreeMap::new();
    let mut observed: BTreeSet<HourBucket> = BTreeSet::new();

    for event in events {
        let hour = HourBucket::of(&event.timestamp());
        observed.insert(hour);
        if let EventPayload::ReservationCreated { .. } = event.payload() {
            *counts.entry(hour).or_default() += 1;
        }
    }

    Box::new(observed.into_iter().map(move |hour| {
        let count_at = |h: HourBucket| counts.get(&h).copied().unwrap_or(0) as f64;
        let prev_3h: Vec<f64> = (1..=3).map(|k| count_at(hour.back(k))).collect();
        let same_hour_7d: Vec<f64> = (1..=7).map(|k| count_at(hour.back(24 * k))).collect();

        let mut row = hourly_calendar(&hour.calendar());
        row.extend([
            f4(count_at(hour.back(1))),
            f4(count_at(hour.back(24))),
            f4(mean(&prev_3h)),
            f4(mean(&same_hour_7d)),
        ]);
        row.push(counts.get(&hour).copied().unwrap_or(0).to_string());
        row
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use crate::{build_dataset, DatasetKind, DatasetParams, ExportSources};

    use super::*;

    fn base() -> DateTime<Utc> {
        // Monday 2024-04-01 00:00 UTC
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
    }

    fn created(ts: DateTime<Utc>, order_id: &str, channel: Channel) -> MetricEvent {
        MetricEvent::new(
            ts,
            EventPayload::OrderCreated {
                order_id: order_id.into(),
                channel,
                service_type: ServiceType::Barista,
            },
        )
    }

    fn demand(ts: DateTime<Utc>, order_id: &str, item: &str, quantity: i64) -> MetricEvent {
        MetricEvent::new(
            ts,
            EventPayload::OrderItemDemand {
                order_id: order_id.into(),
                menu_item_id: item.into(),
                channel: Channel::DineIn,
                service_type: ServiceType::Barista,
                quantity,
            },
        )
    }

    fn reservation(ts: DateTime<Utc>, id: &str) -> MetricEvent {
        MetricEvent::new(
            ts,
            EventPayload::ReservationCreated {
                reservation_id: id.into(),
                party_size: 2,
                area_id: None,
                table_id: None,
            },
        )
    }

    fn rows(kind: DatasetKind, events: Vec<MetricEvent>) -> Vec<FeatureRow> {
        build_dataset(kind, DatasetParams::default(), ExportSources::from_events(events))
            .rows()
            .collect()
    }

    fn col(kind: DatasetKind, name: &str) -> usize {
        kind.header().iter().position(|h| *h == name).unwrap()
    }

    #[test]
    fn workload_lag_features_come_from_previous_hour() {
        let t0 = base() + Duration::hours(9);
        let t1 = t0 + Duration::hours(1);
        let events = vec![
            created(t0 + Duration::minutes(5), "a", Channel::DineIn),
            demand(t0 + Duration::minutes(5), "a", "latte", 2),
            demand(t0 + Duration::minutes(5), "a", "scone", 1),
            created(t0 + Duration::minutes(40), "b", Channel::Takeaway),
            demand(t0 + Duration::minutes(40), "b", "latte", 1),
            created(t1 + Duration::minutes(10), "c", Channel::Delivery),
        ];

        let out = rows(DatasetKind::WorkloadHourly, events);
        assert_eq!(out.len(), 2);

        let k = DatasetKind::WorkloadHourly;
        let first = &out[0];
        assert_eq!(first[col(k, "hour")], "9");
        assert_eq!(first[col(k, "lag1hOrders")], "0.0000");
        assert_eq!(first[col(k, "targetOrders")], "2");

        let second = &out[1];
        assert_eq!(second[col(k, "hour")], "10");
        assert_eq!(second[col(k, "lag1hOrders")], "2.0000");
        assert_eq!(second[col(k, "lag1hItems")], "4.0000");
        assert_eq!(second[col(k, "lag1hDistinctOrders")], "2.0000");
        assert_eq!(second[col(k, "lag1hAvgItemsPerOrder")], "2.0000");
        assert_eq!(second[col(k, "lag1hDineIn")], "1.0000");
        assert_eq!(second[col(k, "lag1hTakeaway")], "1.0000");
        assert_eq!(second[col(k, "lag1hDelivery")], "0.0000");
        assert_eq!(second[col(k, "lag1hBarista")], "2.0000");
        assert_eq!(second[col(k, "rolling3hAvgOrders")], "0.6667");
        assert_eq!(second[col(k, "targetOrders")], "1");
    }

    #[test]
    fn workload_same_hour_window_spans_seven_days() {
        let nine = base() + Duration::hours(9);
        let mut events = Vec::new();
        for day in 1..=7 {
            events.push(created(nine + Duration::days(day), &format!("o{day}"), Channel::Pickup));
        }
        let k = DatasetKind::WorkloadHourly;
        let out = rows(k, events.clone());
        let last = out.last().unwrap();
        // Day 7 sees days 1..6 at offsets 24h..144h; offset 168h (day 0) is empty.
        assert_eq!(last[col(k, "rolling7dSameHourAvgOrders")], f4(6.0 / 7.0));
        assert_eq!(last[col(k, "lag24hOrders")], "1.0000");
        assert_eq!(last[col(k, "isWeekend")], "false");
    }

    #[test]
    fn inventory_only_hours_are_emitted_with_zero_target() {
        let ts = base() + Duration::hours(3);
        let events = vec![MetricEvent::new(
            ts,
            EventPayload::InventoryLow {
                inventory_item_id: "i".into(),
                sku: "MILK".into(),
                level: 1,
                threshold: 4,
            },
        )];
        let k = DatasetKind::WorkloadHourly;
        let out = rows(k, events);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0][col(k, "targetOrders")], "0");
    }

    #[test]
    fn reservations_hourly_counts_and_lags() {
        let t0 = base() + Duration::hours(18);
        let events = vec![
            reservation(t0, "r1"),
            reservation(t0 + Duration::minutes(30), "r2"),
            reservation(t0 + Duration::hours(1), "r3"),
        ];
        let k = DatasetKind::ReservationsHourly;
        let out = rows(k, events);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][col(k, "targetReservations")], "2");
        assert_eq!(out[1][col(k, "lag1hReservations")], "2.0000");
        assert_eq!(out[1][col(k, "targetReservations")], "1");
    }

    #[test]
    fn demand_hourly_sums_per_item_and_hour() {
        let t0 = base() + Duration::hours(8);
        let events = vec![
            demand(t0, "a", "latte", 2),
            demand(t0 + Duration::minutes(20), "b", "latte", 3),
            demand(t0 + Duration::minutes(20), "b", "mocha", 1),
        ];
        let out = rows(DatasetKind::DemandHourly, events);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][0], "latte");
        assert_eq!(out[0][6], "5");
        assert_eq!(out[1][0], "mocha");
        assert_eq!(out[1][6], "1");
    }

    fn arb_events() -> impl Strategy<Value = Vec<MetricEvent>> {
        let event = (0i64..24 * 21, 0u8..3, 0u8..4, 1i64..5).prop_map(|(h, kind, slot, qty)| {
            let ts = base() + Duration::hours(h) + Duration::minutes((h * 7) % 60);
            let id = format!("o{}", h % 11);
            match kind {
                0 => created(ts, &id, [Channel::DineIn, Channel::Takeaway, Channel::Pickup, Channel::Delivery][slot as usize]),
                1 => demand(ts, &id, "latte", qty),
                _ => reservation(ts, &id),
            }
        });
        prop::collection::vec(event, 0..60)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            .. ProptestConfig::default()
        })]

        #[test]
        fn workload_target_is_current_hour_and_lags_exclude_it(events in arb_events()) {
            let k = DatasetKind::WorkloadHourly;
            let mut created_per_hour: BTreeMap<HourBucket, u64> = BTreeMap::new();
            for e in &events {
                if e.kind() == cafeops_events::EventType::OrderCreated {
                    *created_per_hour.entry(HourBucket::of(&e.timestamp())).or_default() += 1;
                }
            }
            let count = |h: HourBucket| created_per_hour.get(&h).copied().unwrap_or(0);

            let mut prev_key: Option<(i32, u32, u32, u32)> = None;
            for row in rows(k, events.clone()) {
                let ts = Utc
                    .with_ymd_and_hms(
                        row[0].parse().unwrap(),
                        row[1].parse().unwrap(),
                        row[2].parse().unwrap(),
                        row[3].parse().unwrap(),
                        0,
                        0,
                    )
                    .unwrap();
                let hour = HourBucket::of(&ts);
                let key = (row[0].parse().unwrap(), row[1].parse().unwrap(), row[2].parse().unwrap(), row[3].parse().unwrap());
                if let Some(prev) = prev_key {
                    prop_assert!(prev < key);
                }
                prev_key = Some(key);

                prop_assert_eq!(row[col(k, "targetOrders")].clone(), count(hour).to_string());
                prop_assert_eq!(row[col(k, "lag1hOrders")].clone(), f4(count(hour.back(1)) as f64));
                prop_assert_eq!(row[col(k, "lag24hOrders")].clone(), f4(count(hour.back(24)) as f64));
                let prev3 = (1..=3).map(|i| count(hour.back(i))).sum::<u64>() as f64 / 3.0;
                prop_assert_eq!(row[col(k, "rolling3hAvgOrders")].clone(), f4(prev3));
            }
        }
    }
}

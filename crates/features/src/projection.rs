//! Per-event projections (no bucketing).

use chrono::SecondsFormat;

use cafeops_events::{EventPayload, MetricEvent};

use crate::dataset::{FeatureRow, Rows};
use crate::format::{event_calendar, f4, opt};

pub(crate) const RAW_HEADER: &[&str] = &[
    "type",
    "timestamp",
    "year",
    "month",
    "day",
    "hour",
    "weekday",
    "orderId",
    "channel",
    "serviceType",
    "secondsToComplete",
    "menuItemId",
    "quantity",
    "inventoryItemId",
    "sku",
    "level",
    "threshold",
    "reservationId",
    "partySize",
    "areaId",
    "tableId",
    "priceCents",
    "available",
];

pub(crate) const ORDER_COMPLETED_HEADER: &[&str] = &[
    "orderId",
    "channel",
    "serviceType",
    "secondsToComplete",
    "year",
    "month",
    "day",
    "hour",
    "weekday",
];

pub(crate) const ORDER_ITEM_DEMAND_HEADER: &[&str] = &[
    "orderId",
    "menuItemId",
    "channel",
    "serviceType",
    "quantity",
    "year",
    "month",
    "day",
    "hour",
    "weekday",
];

pub(crate) fn raw_rows(events: Vec<MetricEvent>) -> Rows {
    Box::new(events.into_iter().map(|e| raw_row(&e)))
}

fn raw_row(event: &MetricEvent) -> FeatureRow {
    let fields = event.fields();
    let mut row = vec![
        event.kind().as_str().to_string(),
        event.timestamp().to_rfc3339_opts(SecondsFormat::Millis, true),
    ];
    row.extend(event_calendar(event.calendar()));
    row.extend([
        opt(fields.order_id),
        opt(fields.channel.map(|c| c.as_str())),
        opt(fields.service_type.map(|s| s.as_str())),
        fields.seconds_to_complete.map(f4).unwrap_or_default(),
        opt(fields.menu_item_id),
        opt(fields.quantity),
        opt(fields.inventory_item_id),
        opt(fields.sku),
        opt(fields.level),
        opt(fields.threshold),
        opt(fields.reservation_id),
        opt(fields.party_size),
        opt(fields.area_id),
        opt(fields.table_id),
        opt(fields.price_cents),
        opt(fields.available),
    ]);
    row
}

pub(crate) fn order_completed_rows(events: Vec<MetricEvent>) -> Rows {
    Box::new(events.into_iter().filter_map(|e| match e.payload() {
        EventPayload::OrderCompleted {
            order_id,
            channel,
            service_type,
            seconds_to_complete,
        } => {
            let mut row = vec![
                order_id.clone(),
                channel.as_str().to_string(),
                service_type.as_str().to_string(),
                f4(*seconds_to_complete),
            ];
            row.extend(event_calendar(e.calendar()));
            Some(row)
        }
        _ => None,
    }))
}

pub(crate) fn order_item_demand_rows(events: Vec<MetricEvent>) -> Rows {
    Box::new(events.into_iter().filter_map(|e| match e.payload() {
        EventPayload::OrderItemDemand {
            order_id,
            menu_item_id,
            channel,
            service_type,
            quantity,
        } => {
            let mut row = vec![
                order_id.clone(),
                menu_item_id.clone(),
                channel.as_str().to_string(),
                service_type.as_str().to_string(),
                quantity.to_string(),
            ];
            row.extend(event_calendar(e.calendar()));
            Some(row)
        }
        _ => None,
    }))
}

use crate::event::EventPayload;
use crate::kinds::{Channel, ServiceType};

/// Every optional domain field of an event, flattened.
///
/// Used by exports that need a fixed column layout regardless of event type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
    pub order_id: Option<String>,
    pub channel: Option<Channel>,
    pub service_type: Option<ServiceType>,
    pub seconds_to_complete: Option<f64>,
    pub menu_item_id: Option<String>,
    pub quantity: Option<i64>,
    pub inventory_item_id: Option<String>,
    pub sku: Option<String>,
    pub level: Option<i64>,
    pub threshold: Option<i64>,
    pub reservation_id: Option<String>,
    pub party_size: Option<u32>,
    pub area_id: Option<String>,
    pub table_id: Option<String>,
    pub price_cents: Option<i64>,
    pub available: Option<bool>,
}

impl EventFields {
    pub fn from_payload(payload: &EventPayload) -> Self {
        match payload.clone() {
            EventPayload::OrderCreated {
                order_id,
                channel,
                service_type,
            }
            | EventPayload::OrderCanceled {
                order_id,
                channel,
                service_type,
            } => Self {
                order_id: Some(order_id),
                channel: Some(channel),
                service_type: Some(service_type),
                ..Self::default()
            },
            EventPayload::OrderCompleted {
                order_id,
                channel,
                service_type,
                seconds_to_complete,
            } => Self {
                order_id: Some(order_id),
                channel: Some(channel),
                service_type: Some(service_type),
                seconds_to_complete: Some(seconds_to_complete),
                ..Self::default()
            },
            EventPayload::OrderItemDemand {
                order_id,
                menu_item_id,
                channel,
                service_type,
                quantity,
            } => Self {
                order_id: Some(order_id),
                menu_item_id: Some(menu_item_id),
                channel: Some(channel),
                service_type: Some(service_type),
                quantity: Some(quantity),
                ..Self::default()
            },
            EventPayload::InventoryLevel {
                inventory_item_id,
                sku,
                level,
                threshold,
            }
            | EventPayload::InventoryLow {
                inventory_item_id,
                sku,
                level,
                threshold,
            } => Self {
                inventory_item_id: Some(inventory_item_id),
                sku: Some(sku),
                level: Some(level),
                threshold: Some(threshold),
                ..Self::default()
            },
            EventPayload::ReservationCreated {
                reservation_id,
                party_size,
                area_id,
                table_id,
            } => Self {
                reservation_id: Some(reservation_id),
                party_size: Some(party_size),
                area_id,
                table_id,
                ..Self::default()
            },
            EventPayload::MenuItemUpdated {
                menu_item_id,
                price_cents,
            } => Self {
                menu_item_id: Some(menu_item_id),
                price_cents: Some(price_cents),
                ..Self::default()
            },
            EventPayload::MenuItemAvailability {
                menu_item_id,
                available,
            } => Self {
                menu_item_id: Some(menu_item_id),
                available: Some(available),
                ..Self::default()
            },
        }
    }
}

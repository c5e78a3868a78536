use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cafeops_core::CalendarFields;

use crate::fields::EventFields;
use crate::kinds::{Channel, EventType, ServiceType};

/// Type-specific fields of an operational event.
///
/// Only the fields relevant to a variant exist on it, so "absent" is never
/// confused with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventPayload {
    #[serde(rename_all = "camelCase")]
    OrderCreated {
        order_id: String,
        channel: Channel,
        service_type: ServiceType,
    },
    #[serde(rename_all = "camelCase")]
    OrderCompleted {
        order_id: String,
        channel: Channel,
        service_type: ServiceType,
        seconds_to_complete: f64,
    },
    #[serde(rename_all = "camelCase")]
    OrderCanceled {
        order_id: String,
        channel: Channel,
        service_type: ServiceType,
    },
    #[serde(rename_all = "camelCase")]
    OrderItemDemand {
        order_id: String,
        menu_item_id: String,
        channel: Channel,
        service_type: ServiceType,
        quantity: i64,
    },
    #[serde(rename_all = "camelCase")]
    InventoryLevel {
        inventory_item_id: String,
        sku: String,
        level: i64,
        threshold: i64,
    },
    #[serde(rename_all = "camelCase")]
    InventoryLow {
        inventory_item_id: String,
        sku: String,
        level: i64,
        threshold: i64,
    },
    #[serde(rename_all = "camelCase")]
    ReservationCreated {
        reservation_id: String,
        party_size: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    MenuItemUpdated {
        menu_item_id: String,
        price_cents: i64,
    },
    #[serde(rename_all = "camelCase")]
    MenuItemAvailability {
        menu_item_id: String,
        available: bool,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::OrderCreated { .. } => EventType::OrderCreated,
            EventPayload::OrderCompleted { .. } => EventType::OrderCompleted,
            EventPayload::OrderCanceled { .. } => EventType::OrderCanceled,
            EventPayload::OrderItemDemand { .. } => EventType::OrderItemDemand,
            EventPayload::InventoryLevel { .. } => EventType::InventoryLevel,
            EventPayload::InventoryLow { .. } => EventType::InventoryLow,
            EventPayload::ReservationCreated { .. } => EventType::ReservationCreated,
            EventPayload::MenuItemUpdated { .. } => EventType::MenuItemUpdated,
            EventPayload::MenuItemAvailability { .. } => EventType::MenuItemAvailability,
        }
    }
}

/// Canonical operational event record.
///
/// The calendar fields are derived from `timestamp` on construction (and again
/// on deserialization), so they can never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EventRecord")]
pub struct MetricEvent {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    calendar: CalendarFields,
    #[serde(flatten)]
    payload: EventPayload,
}

/// Wire shape accepted on deserialization; stored calendar fields are ignored.
#[derive(Deserialize)]
struct EventRecord {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    payload: EventPayload,
}

impl From<EventRecord> for MetricEvent {
    fn from(record: EventRecord) -> Self {
        MetricEvent::new(record.timestamp, record.payload)
    }
}

impl MetricEvent {
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            calendar: CalendarFields::from_timestamp(&timestamp),
            timestamp,
            payload,
        }
    }

    /// Stamp a payload with the current time.
    pub fn now(payload: EventPayload) -> Self {
        Self::new(Utc::now(), payload)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn calendar(&self) -> &CalendarFields {
        &self.calendar
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn kind(&self) -> EventType {
        self.payload.event_type()
    }

    /// Flat view with every optional field (unset fields are `None`).
    pub fn fields(&self) -> EventFields {
        EventFields::from_payload(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn demand_event() -> MetricEvent {
        MetricEvent::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            EventPayload::OrderItemDemand {
                order_id: "o-1".into(),
                menu_item_id: "latte".into(),
                channel: Channel::Takeaway,
                service_type: ServiceType::Barista,
                quantity: 2,
            },
        )
    }

    #[test]
    fn serializes_flat_record_with_only_relevant_fields() {
        let value = serde_json::to_value(demand_event()).unwrap();

        assert_eq!(value["type"], json!("orderItemDemand"));
        assert_eq!(value["menuItemId"], json!("latte"));
        assert_eq!(value["channel"], json!("takeaway"));
        assert_eq!(value["year"], json!(2024));
        assert_eq!(value["hour"], json!(9));
        // 2024-06-01 was a Saturday.
        assert_eq!(value["weekday"], json!(7));
        assert!(value.get("sku").is_none());
        assert!(value.get("partySize").is_none());
    }

    #[test]
    fn deserialization_recomputes_calendar_fields() {
        let raw = json!({
            "type": "reservationCreated",
            "timestamp": "2024-01-07T18:05:00Z",
            "year": 1999,
            "month": 1,
            "day": 1,
            "hour": 0,
            "weekday": 3,
            "reservationId": "r-9",
            "partySize": 4
        });

        let event: MetricEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.calendar().year, 2024);
        assert_eq!(event.calendar().hour, 18);
        assert_eq!(event.calendar().weekday, 1);
        assert_eq!(
            event.payload(),
            &EventPayload::ReservationCreated {
                reservation_id: "r-9".into(),
                party_size: 4,
                area_id: None,
                table_id: None,
            }
        );
    }

    #[test]
    fn round_trip_preserves_event() {
        let event = demand_event();
        let bytes = serde_json::to_vec(&event).unwrap();
        let back: MetricEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), EventType::OrderItemDemand);
    }
}

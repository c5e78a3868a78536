use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

/// Discriminant of [`crate::EventPayload`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    OrderCreated,
    OrderCompleted,
    OrderCanceled,
    OrderItemDemand,
    InventoryLevel,
    InventoryLow,
    ReservationCreated,
    MenuItemUpdated,
    MenuItemAvailability,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::OrderCreated,
        EventType::OrderCompleted,
        EventType::OrderCanceled,
        EventType::OrderItemDemand,
        EventType::InventoryLevel,
        EventType::InventoryLow,
        EventType::ReservationCreated,
        EventType::MenuItemUpdated,
        EventType::MenuItemAvailability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "orderCreated",
            EventType::OrderCompleted => "orderCompleted",
            EventType::OrderCanceled => "orderCanceled",
            EventType::OrderItemDemand => "orderItemDemand",
            EventType::InventoryLevel => "inventoryLevel",
            EventType::InventoryLow => "inventoryLow",
            EventType::ReservationCreated => "reservationCreated",
            EventType::MenuItemUpdated => "menuItemUpdated",
            EventType::MenuItemAvailability => "menuItemAvailability",
        }
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseKindError {
                kind: "event type",
                value: s.to_string(),
            })
    }
}

/// Sales channel an order came through.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    DineIn,
    Takeaway,
    Pickup,
    Delivery,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::DineIn => "dineIn",
            Channel::Takeaway => "takeaway",
            Channel::Pickup => "pickup",
            Channel::Delivery => "delivery",
        }
    }
}

impl FromStr for Channel {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "dinein" => Ok(Channel::DineIn),
            "takeaway" => Ok(Channel::Takeaway),
            "pickup" => Ok(Channel::Pickup),
            "delivery" => Ok(Channel::Delivery),
            _ => Err(ParseKindError {
                kind: "channel",
                value: s.to_string(),
            }),
        }
    }
}

/// Station that prepares an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceType {
    Barista,
    Kitchen,
    Bakery,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Barista => "barista",
            ServiceType::Kitchen => "kitchen",
            ServiceType::Bakery => "bakery",
        }
    }
}

impl FromStr for ServiceType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "barista" => Ok(ServiceType::Barista),
            "kitchen" => Ok(ServiceType::Kitchen),
            "bakery" => Ok(ServiceType::Bakery),
            _ => Err(ParseKindError {
                kind: "service type",
                value: s.to_string(),
            }),
        }
    }
}

/// Lowercase and drop `_`, `-` and spaces ("dine_in" == "dineIn").
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

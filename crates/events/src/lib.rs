//! Operational event schema.
//!
//! A [`MetricEvent`] is an immutable fact about something that happened in the
//! cafe (an order was placed, stock dipped below its threshold, ...). The set of
//! event types is closed: [`EventPayload`] is matched exhaustively by the writer
//! and by the feature aggregation engine.

pub mod event;
pub mod fields;
pub mod kinds;

pub use event::{EventPayload, MetricEvent};
pub use fields::EventFields;
pub use kinds::{Channel, EventType, ParseKindError, ServiceType};

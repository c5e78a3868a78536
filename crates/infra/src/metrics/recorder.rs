use std::sync::Arc;

use tracing::warn;

use cafeops_events::{Channel, EventPayload, MetricEvent, ServiceType};
use cafeops_inventory::InventoryItem;

use super::writer::{MetricsWriter, WriterError};
use crate::event_store::MetricsStore;

/// Destination for emitted events.
pub trait EventSink: Send + Sync {
    fn append(&self, event: MetricEvent) -> Result<(), WriterError>;
}

impl<S> EventSink for Arc<S>
where
    S: EventSink + ?Sized,
{
    fn append(&self, event: MetricEvent) -> Result<(), WriterError> {
        (**self).append(event)
    }
}

impl<S> EventSink for MetricsWriter<S>
where
    S: MetricsStore + 'static,
{
    fn append(&self, event: MetricEvent) -> Result<(), WriterError> {
        MetricsWriter::append(self, event)
    }
}

/// Maps domain actions to typed events.
///
/// Best-effort: a rejected append is logged and swallowed so metrics capture
/// never fails the business operation that triggered it.
#[derive(Clone)]
pub struct MetricsRecorder {
    sink: Arc<dyn EventSink>,
}

impl MetricsRecorder {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    fn emit(&self, payload: EventPayload) {
        let event = MetricEvent::now(payload);
        let kind = event.kind();
        if let Err(e) = self.sink.append(event) {
            warn!(event_type = %kind, error = %e, "metrics event dropped");
        }
    }

    pub fn record_order_created(&self, order_id: &str, channel: Channel, service_type: ServiceType) {
        self.emit(EventPayload::OrderCreated {
            order_id: order_id.to_string(),
            channel,
            service_type,
        });
    }

    pub fn record_order_item_demand(
        &self,
        order_id: &str,
        menu_item_id: &str,
        channel: Channel,
        service_type: ServiceType,
        quantity: i64,
    ) {
        self.emit(EventPayload::OrderItemDemand {
            order_id: order_id.to_string(),
            menu_item_id: menu_item_id.to_string(),
            channel,
            service_type,
            quantity,
        });
    }

    pub fn record_order_completed(
        &self,
        order_id: &str,
        channel: Channel,
        service_type: ServiceType,
        elapsed_seconds: f64,
    ) {
        self.emit(EventPayload::OrderCompleted {
            order_id: order_id.to_string(),
            channel,
            service_type,
            seconds_to_complete: elapsed_seconds,
        });
    }

    pub fn record_order_canceled(&self, order_id: &str, channel: Channel, service_type: ServiceType) {
        self.emit(EventPayload::OrderCanceled {
            order_id: order_id.to_string(),
            channel,
            service_type,
        });
    }

    pub fn record_inventory_level(&self, item_id: &str, sku: &str, level: i64, threshold: i64) {
        self.emit(EventPayload::InventoryLevel {
            inventory_item_id: item_id.to_string(),
            sku: sku.to_string(),
            level,
            threshold,
        });
    }

    pub fn record_inventory_low(&self, item_id: &str, sku: &str, level: i64, threshold: i64) {
        self.emit(EventPayload::InventoryLow {
            inventory_item_id: item_id.to_string(),
            sku: sku.to_string(),
            level,
            threshold,
        });
    }

    /// Level event for every create/update, plus a low event at or below threshold.
    pub fn record_inventory_snapshot(&self, item: &InventoryItem) {
        self.record_inventory_level(&item.id, &item.sku, item.quantity, item.reorder_threshold);
        if item.is_low() {
            self.record_inventory_low(&item.id, &item.sku, item.quantity, item.reorder_threshold);
        }
    }

    pub fn record_menu_price_cents(&self, menu_item_id: &str, price_cents: i64) {
        self.emit(EventPayload::MenuItemUpdated {
            menu_item_id: menu_item_id.to_string(),
            price_cents,
        });
    }

    pub fn record_menu_availability(&self, menu_item_id: &str, available: bool) {
        self.emit(EventPayload::MenuItemAvailability {
            menu_item_id: menu_item_id.to_string(),
            available,
        });
    }

    pub fn record_reservation_created(
        &self,
        reservation_id: &str,
        party_size: u32,
        area_id: Option<&str>,
        table_id: Option<&str>,
    ) {
        self.emit(EventPayload::ReservationCreated {
            reservation_id: reservation_id.to_string(),
            party_size,
            area_id: area_id.map(str::to_string),
            table_id: table_id.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use cafeops_events::EventType;

    use super::*;
    use crate::event_store::InMemoryMetricsStore;
    use crate::metrics::WriterConfig;

    #[derive(Default)]
    struct CapturingSink {
        events: Mutex<Vec<MetricEvent>>,
    }

    impl CapturingSink {
        fn kinds(&self) -> Vec<EventType> {
            self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
        }
    }

    impl EventSink for CapturingSink {
        fn append(&self, event: MetricEvent) -> Result<(), WriterError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[test]
    fn each_call_emits_exactly_one_matching_event() {
        let sink = Arc::new(CapturingSink::default());
        let recorder = MetricsRecorder::new(sink.clone());

        recorder.record_order_created("o1", Channel::Takeaway, ServiceType::Barista);
        recorder.record_order_item_demand("o1", "latte", Channel::Takeaway, ServiceType::Barista, 2);
        recorder.record_order_completed("o1", Channel::Takeaway, ServiceType::Barista, 95.5);
        recorder.record_order_canceled("o2", Channel::Delivery, ServiceType::Kitchen);
        recorder.record_menu_price_cents("latte", 475);
        recorder.record_menu_availability("latte", false);
        recorder.record_reservation_created("r1", 4, Some("patio"), None);

        assert_eq!(
            sink.kinds(),
            vec![
                EventType::OrderCreated,
                EventType::OrderItemDemand,
                EventType::OrderCompleted,
                EventType::OrderCanceled,
                EventType::MenuItemUpdated,
                EventType::MenuItemAvailability,
                EventType::ReservationCreated,
            ]
        );

        let events = sink.events.lock().unwrap();
        let fields = events[6].fields();
        assert_eq!(fields.area_id.as_deref(), Some("patio"));
        assert_eq!(fields.table_id, None);
        assert_eq!(fields.order_id, None);
    }

    #[test]
    fn inventory_snapshot_adds_low_event_at_threshold() {
        let sink = Arc::new(CapturingSink::default());
        let recorder = MetricsRecorder::new(sink.clone());

        recorder.record_inventory_snapshot(&InventoryItem::new("i1", "MILK", 6, 5));
        assert_eq!(sink.kinds(), vec![EventType::InventoryLevel]);

        recorder.record_inventory_snapshot(&InventoryItem::new("i1", "MILK", 5, 5));
        assert_eq!(
            sink.kinds(),
            vec![EventType::InventoryLevel, EventType::InventoryLevel, EventType::InventoryLow]
        );
    }

    #[tokio::test]
    async fn closed_writer_does_not_fail_caller() {
        let writer = Arc::new(MetricsWriter::new(InMemoryMetricsStore::new(), WriterConfig::default()));
        writer.shutdown().await;

        let recorder = MetricsRecorder::new(writer.clone());
        recorder.record_menu_availability("latte", true);
        assert_eq!(writer.stats().pending, 0);
    }
}

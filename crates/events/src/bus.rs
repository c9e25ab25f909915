//! Event bus abstraction for decoupled event emission.
//!
//! The switching service publishes state through this trait so observers
//! (an indicator UI, logging, tests) never read its internal state.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit `payload` under `topic` (see [`crate::event_names`]).
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it. Serialization failures are logged and dropped.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::warn!(topic, error = %e, "Failed to serialize event"),
    }
}

/// Records every event; tests assert on what the service published.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// One recorded emission.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.lock().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Event bus that writes every event to the log.
///
/// Used by the daemon when no UI is attached.
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        tracing::info!(topic, %payload, "event");
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_for_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("switcher:state_changed", json!({"input_source_id": "abc"}));
        bus.emit("input:punctuation_status", json!({"active": true}));
        bus.emit("switcher:state_changed", json!({"input_source_id": "pinyin"}));

        assert_eq!(bus.len(), 3);
        let states = bus.events_for("switcher:state_changed");
        assert_eq!(states.len(), 2);
        assert_eq!(states[1].payload["input_source_id"], "pinyin");
        assert!(bus.events_for("input:permission_denied").is_empty());

        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_emit_event_serializes() {
        #[derive(Serialize)]
        struct Ping {
            n: u32,
        }

        let bus = InMemoryEventBus::new();
        emit_event(&bus, "test:ping", &Ping { n: 7 });

        assert_eq!(bus.events_for("test:ping")[0].payload, json!({"n": 7}));
    }

    #[test]
    fn test_null_and_tracing_buses() {
        // Should not panic
        NullEventBus.emit("test:event", json!({"data": "ignored"}));
        TracingEventBus.emit("test:event", json!({"data": "logged"}));
    }
}

//! Published event contracts for keyshift.
//!
//! Defines the DTOs observers receive from the switching service and the
//! punctuation engine, and the `EventBus` trait they are emitted through.
//! Shared types keep producers and consumers agreeing on field names.

mod bus;

pub use bus::{
    emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus,
    TracingEventBus,
};

use serde::{Deserialize, Serialize};

/// Emitted for every published switching state.
///
/// Producers: switching service
/// Consumers: input source indicator, logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangedEvent {
    /// Focused application bundle ID.
    #[serde(default)]
    pub app: Option<String>,
    /// Website host when the app is a supported browser.
    #[serde(default)]
    pub website: Option<String>,
    pub input_source_id: String,
    pub input_source_name: String,
    #[serde(default)]
    pub is_cjkv: bool,
    /// `no_change`, `system`, `shortcut` or `app_specified`.
    pub reason: String,
    /// The app's rule asks not to show the indicator.
    #[serde(default)]
    pub hide_indicator: bool,
    /// Timestamp in milliseconds since epoch.
    #[serde(default)]
    pub ts_ms: i64,
}

/// Emitted when punctuation substitution turns on or off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunctuationStatusEvent {
    pub active: bool,
    #[serde(default)]
    pub app: Option<String>,
}

/// Emitted when the keyboard tap could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDeniedEvent {
    /// Which permission is missing, e.g. `input_monitoring`.
    pub permission: String,
    pub message: String,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const STATE_CHANGED: &str = "switcher:state_changed";
    pub const PUNCTUATION_STATUS: &str = "input:punctuation_status";
    pub const PERMISSION_DENIED: &str = "input:permission_denied";
}

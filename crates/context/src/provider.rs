//! Tracker traits for focused-context detection.
//!
//! These traits abstract platform-specific implementations,
//! allowing the switching logic to remain pure and testable.

use crate::state::AppKind;
use std::sync::RwLock;

/// Source of the currently focused app/website.
pub trait ContextTracker: Send + Sync {
    /// Get the currently focused context.
    fn current(&self) -> Option<AppKind>;

    /// Bundle IDs of all running applications.
    ///
    /// Used to detect terminations. Trackers that cannot enumerate running
    /// apps return an empty list, which disables termination events.
    fn running_bundle_ids(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Null implementation for testing or unsupported platforms.
pub struct NullProvider;

impl ContextTracker for NullProvider {
    fn current(&self) -> Option<AppKind> {
        None
    }
}

/// Tracker whose state is set by hand.
///
/// Backs tests and hosts that learn about focus changes from elsewhere.
#[derive(Debug, Default)]
pub struct StaticContextTracker {
    current: RwLock<Option<AppKind>>,
    running: RwLock<Vec<String>>,
}

impl StaticContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&self, kind: Option<AppKind>) {
        if let Ok(mut guard) = self.current.write() {
            if let Some(ref kind) = kind {
                if let Ok(mut running) = self.running.write() {
                    if !running.iter().any(|b| b == kind.bundle_id()) {
                        running.push(kind.bundle_id().to_string());
                    }
                }
            }
            *guard = kind;
        }
    }

    pub fn set_running(&self, bundle_ids: Vec<String>) {
        if let Ok(mut guard) = self.running.write() {
            *guard = bundle_ids;
        }
    }
}

impl ContextTracker for StaticContextTracker {
    fn current(&self) -> Option<AppKind> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    fn running_bundle_ids(&self) -> Vec<String> {
        self.running
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

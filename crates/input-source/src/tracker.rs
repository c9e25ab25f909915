//! Input source tracker trait and in-memory implementation.

use crate::error::{InputSourceError, Result};
use crate::source::InputSource;
use std::sync::RwLock;

/// Reads and selects the active keyboard input source.
pub trait InputSourceTracker: Send + Sync {
    /// The currently selected input source.
    fn current(&self) -> Result<InputSource>;

    /// Select an input source.
    fn select(&self, source: &InputSource) -> Result<()>;

    /// All selectable keyboard input sources.
    fn list(&self) -> Vec<InputSource>;

    /// Look up an installed input source by ID.
    fn find(&self, id: &str) -> Option<InputSource> {
        self.list().into_iter().find(|s| s.id == id)
    }
}

impl<T: InputSourceTracker + ?Sized> InputSourceTracker for std::sync::Arc<T> {
    fn current(&self) -> Result<InputSource> {
        (**self).current()
    }

    fn select(&self, source: &InputSource) -> Result<()> {
        (**self).select(source)
    }

    fn list(&self) -> Vec<InputSource> {
        (**self).list()
    }

    fn find(&self, id: &str) -> Option<InputSource> {
        (**self).find(id)
    }
}

/// Tracker backed by a fixed list, with selections recorded for inspection.
///
/// Used by tests and on platforms without a native backend.
#[derive(Debug)]
pub struct MemoryInputSourceTracker {
    sources: Vec<InputSource>,
    current: RwLock<Option<InputSource>>,
    selections: RwLock<Vec<String>>,
}

impl MemoryInputSourceTracker {
    /// Create a tracker whose current source is the first of `sources`.
    pub fn new(sources: Vec<InputSource>) -> Self {
        let current = sources.first().cloned();
        Self {
            sources,
            current: RwLock::new(current),
            selections: RwLock::new(Vec::new()),
        }
    }

    /// Simulate a change made outside the tracker (user or system switch).
    pub fn set_current(&self, source: InputSource) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(source);
        }
    }

    /// IDs passed to `select`, in call order.
    pub fn selections(&self) -> Vec<String> {
        self.selections
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl InputSourceTracker for MemoryInputSourceTracker {
    fn current(&self) -> Result<InputSource> {
        self.current
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(InputSourceError::Unavailable)
    }

    fn select(&self, source: &InputSource) -> Result<()> {
        if !self.sources.iter().any(|s| s.id == source.id) {
            return Err(InputSourceError::NotInstalled(source.id.clone()));
        }
        if let Ok(mut selections) = self.selections.write() {
            selections.push(source.id.clone());
        }
        self.set_current(source.clone());
        Ok(())
    }

    fn list(&self) -> Vec<InputSource> {
        self.sources.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> MemoryInputSourceTracker {
        MemoryInputSourceTracker::new(vec![
            InputSource::new("abc", "ABC", false),
            InputSource::new("pinyin", "Pinyin", true),
        ])
    }

    #[test]
    fn test_initial_current_is_first() {
        assert_eq!(tracker().current().unwrap().id, "abc");
    }

    #[test]
    fn test_select_records_and_switches() {
        let tracker = tracker();
        let pinyin = tracker.find("pinyin").unwrap();

        tracker.select(&pinyin).unwrap();

        assert_eq!(tracker.current().unwrap().id, "pinyin");
        assert_eq!(tracker.selections(), vec!["pinyin"]);
    }

    #[test]
    fn test_empty_tracker_is_unavailable() {
        let tracker = MemoryInputSourceTracker::new(Vec::new());
        assert!(matches!(tracker.current(), Err(InputSourceError::Unavailable)));
    }

    #[test]
    fn test_select_unknown_fails() {
        let tracker = tracker();
        let result = tracker.select(&InputSource::new("missing", "Missing", false));
        assert!(matches!(result, Err(InputSourceError::NotInstalled(_))));
        assert!(tracker.selections().is_empty());
    }

    #[test]
    fn test_external_change_not_recorded_as_selection() {
        let tracker = tracker();
        tracker.set_current(InputSource::new("pinyin", "Pinyin", true));
        assert_eq!(tracker.current().unwrap().id, "pinyin");
        assert!(tracker.selections().is_empty());
    }
}

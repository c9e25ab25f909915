//! Context poller - background task that monitors focus changes.

use crate::provider::ContextTracker;
use crate::state::{AppKind, ContextEvent};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default polling interval for context changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Callback type for context change events.
pub type ContextCallback = Arc<dyn Fn(ContextEvent) + Send + Sync + 'static>;

/// Tracks what was last seen so only changes are emitted.
#[derive(Debug, Default)]
struct ContextDiff {
    last_focused: Option<AppKind>,
    running: HashSet<String>,
}

impl ContextDiff {
    fn step(&mut self, current: Option<AppKind>, running: Vec<String>) -> Vec<ContextEvent> {
        let mut events = Vec::new();

        // An empty list means the tracker cannot enumerate apps.
        if !running.is_empty() {
            let now: HashSet<String> = running.into_iter().collect();
            let mut gone: Vec<&String> = self.running.difference(&now).collect();
            gone.sort();
            events.extend(gone.into_iter().cloned().map(ContextEvent::Terminated));
            self.running = now;
        }

        // Focus loss (no frontmost app) keeps the last context.
        if let Some(kind) = current {
            let changed = match &self.last_focused {
                None => true,
                Some(last) => !last.is_same(&kind),
            };
            if changed {
                events.push(ContextEvent::Focused(kind.clone()));
                self.last_focused = Some(kind);
            }
        }

        events
    }
}

/// Background poller for focused-context changes.
pub struct ContextPoller {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for ContextPoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl ContextPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling with the given tracker and callback.
    pub fn start<P>(&mut self, provider: Arc<P>, callback: ContextCallback)
    where
        P: ContextTracker + ?Sized + 'static,
    {
        self.start_with_interval(provider, callback, DEFAULT_POLL_INTERVAL);
    }

    /// Start polling with a custom interval.
    pub fn start_with_interval<P>(
        &mut self,
        provider: Arc<P>,
        callback: ContextCallback,
        interval: Duration,
    ) where
        P: ContextTracker + ?Sized + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("ContextPoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("ContextPoller started with interval {:?}", interval);

            let mut diff = ContextDiff::default();

            while running.load(Ordering::SeqCst) {
                let events = diff.step(provider.current(), provider.running_bundle_ids());

                for event in events {
                    match &event {
                        ContextEvent::Focused(kind) => tracing::debug!(
                            app = %kind.bundle_id(),
                            host = ?kind.host,
                            address_bar = kind.address_bar_focused,
                            "context changed"
                        ),
                        ContextEvent::Terminated(bundle_id) => {
                            tracing::debug!(app = %bundle_id, "app terminated")
                        }
                    }
                    callback(event);
                }

                std::thread::sleep(interval);
            }

            tracing::info!("ContextPoller stopped");
        });

        self.handle = Some(handle);
    }

    /// Stop the poller.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the poller is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ContextPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{NullProvider, StaticContextTracker};
    use crate::state::{AppInfo, WebsiteContext};
    use std::sync::Mutex;

    fn kind(bundle_id: &str) -> AppKind {
        AppKind::app(AppInfo::new(bundle_id))
    }

    #[test]
    fn test_diff_emits_first_focus() {
        let mut diff = ContextDiff::default();
        let events = diff.step(Some(kind("com.apple.Notes")), Vec::new());
        assert_eq!(events, vec![ContextEvent::Focused(kind("com.apple.Notes"))]);
    }

    #[test]
    fn test_diff_suppresses_same_context() {
        let mut diff = ContextDiff::default();
        diff.step(Some(kind("com.apple.Notes")), Vec::new());

        let renamed = AppKind::app(AppInfo::new("com.apple.Notes").with_name("Notes"));
        assert!(diff.step(Some(renamed), Vec::new()).is_empty());
        assert!(diff.step(None, Vec::new()).is_empty());
    }

    #[test]
    fn test_diff_emits_website_change() {
        let mut diff = ContextDiff::default();
        let safari = AppInfo::new("com.apple.Safari");
        diff.step(Some(AppKind::app(safari.clone())), Vec::new());

        let events = diff.step(
            Some(AppKind::website(
                safari,
                WebsiteContext {
                    host: Some("github.com".to_string()),
                    address_bar_focused: false,
                },
            )),
            Vec::new(),
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_diff_reports_terminations() {
        let mut diff = ContextDiff::default();
        diff.step(
            None,
            vec!["com.apple.Notes".to_string(), "com.apple.Terminal".to_string()],
        );

        let events = diff.step(None, vec!["com.apple.Notes".to_string()]);
        assert_eq!(
            events,
            vec![ContextEvent::Terminated("com.apple.Terminal".to_string())]
        );
    }

    #[test]
    fn test_diff_ignores_empty_running_list() {
        let mut diff = ContextDiff::default();
        diff.step(None, vec!["com.apple.Notes".to_string()]);
        assert!(diff.step(None, Vec::new()).is_empty());
    }

    #[test]
    fn test_poller_lifecycle() {
        let mut poller = ContextPoller::new();
        assert!(!poller.is_running());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let callback: ContextCallback = Arc::new(move |event| {
            seen_clone.lock().unwrap().push(event);
        });

        let tracker = Arc::new(StaticContextTracker::new());
        tracker.set_current(Some(kind("com.apple.Notes")));

        poller.start_with_interval(Arc::clone(&tracker), callback, Duration::from_millis(20));
        assert!(poller.is_running());

        std::thread::sleep(Duration::from_millis(150));

        poller.stop();
        assert!(!poller.is_running());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "unchanged focus must be emitted once");
    }

    #[test]
    fn test_poller_with_null_provider_emits_nothing() {
        let mut poller = ContextPoller::new();
        let calls = Arc::new(Mutex::new(0usize));
        let calls_clone = Arc::clone(&calls);

        poller.start_with_interval(
            Arc::new(NullProvider),
            Arc::new(move |_| *calls_clone.lock().unwrap() += 1),
            Duration::from_millis(20),
        );
        std::thread::sleep(Duration::from_millis(80));
        poller.stop();

        assert_eq!(*calls.lock().unwrap(), 0);
    }
}

//! Preference watcher - notices preferences saved by another process.

use crate::preferences::{PreferenceRepository, Preferences};
use crate::rule::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default interval between preference reloads.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Callback type for changed preferences.
pub type PreferencesCallback = Arc<dyn Fn(Preferences) + Send + Sync + 'static>;

#[derive(Debug)]
struct PreferenceDiff {
    last: Preferences,
}

impl PreferenceDiff {
    /// New preferences if `loaded` differs from the last seen value.
    ///
    /// A failed load keeps the last value.
    fn step(&mut self, loaded: Result<Preferences>) -> Option<Preferences> {
        match loaded {
            Ok(preferences) if preferences != self.last => {
                self.last = preferences.clone();
                Some(preferences)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "preference reload failed");
                None
            }
        }
    }
}

/// Background reloader for [`Preferences`].
pub struct PreferenceWatcher {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for PreferenceWatcher {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl PreferenceWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from `repository` every `interval`, calling back on change.
    ///
    /// `initial` is the value the caller already applied.
    pub fn start_with_interval<R>(
        &mut self,
        repository: Arc<R>,
        initial: Preferences,
        callback: PreferencesCallback,
        interval: Duration,
    ) where
        R: PreferenceRepository + ?Sized + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("PreferenceWatcher already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("PreferenceWatcher started with interval {:?}", interval);

            let mut diff = PreferenceDiff { last: initial };

            while running.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if let Some(preferences) = diff.step(repository.load_preferences()) {
                    tracing::debug!(strategy = ?preferences.restore_strategy, "preferences changed");
                    callback(preferences);
                }
            }

            tracing::info!("PreferenceWatcher stopped");
        });

        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for PreferenceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::RestoreStrategy;
    use crate::rule::RuleError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryPreferences(Mutex<Preferences>);

    impl PreferenceRepository for MemoryPreferences {
        fn load_preferences(&self) -> Result<Preferences> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
            *self.0.lock().unwrap() = preferences.clone();
            Ok(())
        }
    }

    fn use_default() -> Preferences {
        Preferences {
            restore_strategy: RestoreStrategy::UseDefault,
            default_input_source_id: Some("com.apple.keylayout.ABC".to_string()),
        }
    }

    #[test]
    fn test_diff_reports_only_changes() {
        let mut diff = PreferenceDiff {
            last: Preferences::default(),
        };

        assert_eq!(diff.step(Ok(Preferences::default())), None);
        assert_eq!(diff.step(Ok(use_default())), Some(use_default()));
        assert_eq!(diff.step(Ok(use_default())), None);
    }

    #[test]
    fn test_diff_keeps_last_on_error() {
        let mut diff = PreferenceDiff { last: use_default() };

        let failed = diff.step(Err(RuleError::Poisoned));

        assert_eq!(failed, None);
        assert_eq!(diff.step(Ok(use_default())), None);
    }

    #[test]
    fn test_watcher_reports_saved_preferences() {
        let repository = Arc::new(MemoryPreferences::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut watcher = PreferenceWatcher::new();
        watcher.start_with_interval(
            Arc::clone(&repository),
            Preferences::default(),
            Arc::new(move |preferences: Preferences| sink.lock().unwrap().push(preferences)),
            Duration::from_millis(5),
        );
        assert!(watcher.is_running());

        repository.save_preferences(&use_default()).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        watcher.stop();

        assert_eq!(*seen.lock().unwrap(), vec![use_default()]);
        assert!(!watcher.is_running());
    }
}

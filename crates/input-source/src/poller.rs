//! Background poller that turns input source reads into a change stream.

use crate::source::InputSource;
use crate::tracker::InputSourceTracker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default polling interval for input source changes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Callback type for input source changes.
pub type InputSourceCallback = Arc<dyn Fn(InputSource) + Send + Sync + 'static>;

/// Polls the tracker and reports every change of input source ID.
///
/// The first successful read is reported too, so subscribers start from a
/// known value.
pub struct InputSourcePoller {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Default for InputSourcePoller {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl InputSourcePoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<T>(&mut self, tracker: Arc<T>, callback: InputSourceCallback)
    where
        T: InputSourceTracker + ?Sized + 'static,
    {
        self.start_with_interval(tracker, callback, DEFAULT_POLL_INTERVAL);
    }

    pub fn start_with_interval<T>(
        &mut self,
        tracker: Arc<T>,
        callback: InputSourceCallback,
        interval: Duration,
    ) where
        T: InputSourceTracker + ?Sized + 'static,
    {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("InputSourcePoller already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let handle = std::thread::spawn(move || {
            tracing::info!("InputSourcePoller started with interval {:?}", interval);

            let mut last_id: Option<String> = None;
            let mut read_failed = false;

            while running.load(Ordering::SeqCst) {
                match tracker.current() {
                    Ok(source) => {
                        read_failed = false;
                        if last_id.as_deref() != Some(source.id.as_str()) {
                            tracing::debug!(source = %source.id, cjkv = source.is_cjkv, "input source changed");
                            last_id = Some(source.id.clone());
                            callback(source);
                        }
                    }
                    Err(e) => {
                        // Log once per failure streak
                        if !read_failed {
                            tracing::warn!(error = %e, "Failed to read input source");
                            read_failed = true;
                        }
                    }
                }

                std::thread::sleep(interval);
            }

            tracing::info!("InputSourcePoller stopped");
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

impl Drop for InputSourcePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryInputSourceTracker;
    use std::sync::Mutex;

    #[test]
    fn test_poller_reports_changes_only() {
        let tracker = Arc::new(MemoryInputSourceTracker::new(vec![
            InputSource::new("abc", "ABC", false),
            InputSource::new("pinyin", "Pinyin", true),
        ]));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut poller = InputSourcePoller::new();
        poller.start_with_interval(
            Arc::clone(&tracker),
            Arc::new(move |source: InputSource| seen_clone.lock().unwrap().push(source.id)),
            Duration::from_millis(10),
        );

        std::thread::sleep(Duration::from_millis(60));
        tracker.set_current(InputSource::new("pinyin", "Pinyin", true));
        std::thread::sleep(Duration::from_millis(60));
        poller.stop();

        assert_eq!(*seen.lock().unwrap(), vec!["abc", "pinyin"]);
    }
}

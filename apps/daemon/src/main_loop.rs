//! The main thread's run loop.
//!
//! On macOS the input source API and the notification centers only work on
//! the main thread, so it runs a CFRunLoop that ticks the input source pump
//! while tokio works on its own threads.

use keyshift_input_source::platform::PlatformTracker;
use keyshift_input_source::InputSourcePump;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest stretch the loop runs before checking its stop flag.
const RUN_SLICE: Duration = Duration::from_millis(250);

#[cfg(target_os = "macos")]
pub struct MainLoop {
    _pump: keyshift_input_source::platform::RunLoopPump,
}

#[cfg(target_os = "macos")]
impl MainLoop {
    /// Schedule `pump` on the calling thread's run loop. Call from `main`.
    pub fn start(pump: InputSourcePump<PlatformTracker>, interval: Duration) -> Self {
        Self {
            _pump: keyshift_input_source::platform::RunLoopPump::schedule(pump, interval),
        }
    }

    fn run_slice(&self, slice: Duration) {
        use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};

        let _ = CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, slice, false);
    }
}

#[cfg(not(target_os = "macos"))]
pub struct MainLoop {
    running: std::sync::Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

#[cfg(not(target_os = "macos"))]
impl MainLoop {
    /// Tick `pump` from a helper thread; nothing here needs the main thread.
    pub fn start(pump: InputSourcePump<PlatformTracker>, interval: Duration) -> Self {
        pump.tick();

        let running = std::sync::Arc::new(AtomicBool::new(true));
        let flag = std::sync::Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            while flag.load(Ordering::SeqCst) {
                std::thread::sleep(interval);
                pump.tick();
            }
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    fn run_slice(&self, slice: Duration) {
        std::thread::sleep(slice);
    }
}

#[cfg(not(target_os = "macos"))]
impl Drop for MainLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl MainLoop {
    /// Run until `stop` is set or `timeout` elapses. Returns whether `stop` was set.
    pub fn run_until(&self, stop: &AtomicBool, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            if stop.load(Ordering::SeqCst) {
                return true;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return false;
                    }
                    left.min(RUN_SLICE)
                }
                None => RUN_SLICE,
            };
            self.run_slice(slice);
        }
    }
}

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use super::*;
    use keyshift_input_source::{shared_input_sources, InputSource, InputSourceTracker};
    use std::sync::Arc;

    fn pump_and_view() -> (
        InputSourcePump<PlatformTracker>,
        Arc<keyshift_input_source::SharedInputSources>,
    ) {
        shared_input_sources(PlatformTracker::new(vec![
            InputSource::new("abc", "ABC", false),
            InputSource::new("pinyin", "Pinyin", true),
        ]))
    }

    #[test]
    fn test_selection_is_served_while_running() {
        let (pump, shared) = pump_and_view();
        let main_loop = MainLoop::start(pump, Duration::from_millis(5));

        assert_eq!(shared.current().unwrap().id, "abc");
        let pinyin = shared.find("pinyin").unwrap();
        shared.select(&pinyin).unwrap();
        assert_eq!(shared.current().unwrap().id, "pinyin");

        drop(main_loop);
    }

    #[test]
    fn test_run_until_stops_on_flag_or_timeout() {
        let (pump, _shared) = pump_and_view();
        let main_loop = MainLoop::start(pump, Duration::from_millis(5));

        let stop = AtomicBool::new(false);
        assert!(!main_loop.run_until(&stop, Some(Duration::from_millis(20))));

        stop.store(true, Ordering::SeqCst);
        assert!(main_loop.run_until(&stop, None));
    }
}

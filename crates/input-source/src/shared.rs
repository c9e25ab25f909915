//! Input source state mirrored off the thread that owns the system API.
//!
//! The Text Input Sources API asserts it runs on the main queue. The main
//! thread drives an [`InputSourcePump`], which is the only code that touches
//! the native tracker. Everything else (tap callback, pollers, shortcut
//! listener, switching service) reads the mirrored [`SharedInputSources`]
//! and queues selections for the pump.

use crate::error::{InputSourceError, Result};
use crate::source::InputSource;
use crate::tracker::InputSourceTracker;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// How long `select` waits for the pump to apply a selection.
pub const SELECT_TIMEOUT: Duration = Duration::from_secs(1);

/// The installed list is re-read every this many ticks, or sooner when
/// [`SharedInputSources::request_refresh`] is called.
pub const LIST_REFRESH_TICKS: u32 = 20;

struct SelectRequest {
    source: InputSource,
    reply: mpsc::Sender<Result<()>>,
}

/// Tracker view backed by the pump's last reads.
pub struct SharedInputSources {
    current: RwLock<Option<InputSource>>,
    installed: RwLock<Vec<InputSource>>,
    requests: Mutex<mpsc::Sender<SelectRequest>>,
    refresh: AtomicBool,
    select_timeout: Duration,
}

impl SharedInputSources {
    /// Re-read the installed list on the next tick.
    pub fn request_refresh(&self) {
        self.refresh.store(true, Ordering::SeqCst);
    }

    fn store_current(&self, source: InputSource) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(source);
        }
    }

    fn store_installed(&self, sources: Vec<InputSource>) {
        if let Ok(mut guard) = self.installed.write() {
            *guard = sources;
        }
    }
}

impl InputSourceTracker for SharedInputSources {
    fn current(&self) -> Result<InputSource> {
        self.current
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(InputSourceError::Unavailable)
    }

    /// Queue the selection for the pump and wait for its answer.
    ///
    /// Must not be called from the pump's own thread.
    fn select(&self, source: &InputSource) -> Result<()> {
        let (reply, answer) = mpsc::channel();
        let request = SelectRequest {
            source: source.clone(),
            reply,
        };

        let queued = self
            .requests
            .lock()
            .map(|tx| tx.send(request).is_ok())
            .unwrap_or(false);
        if !queued {
            return Err(InputSourceError::NoResponse(source.id.clone()));
        }

        answer
            .recv_timeout(self.select_timeout)
            .unwrap_or_else(|_| Err(InputSourceError::NoResponse(source.id.clone())))
    }

    fn list(&self) -> Vec<InputSource> {
        self.installed
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Drives the native tracker from its owning thread.
pub struct InputSourcePump<T> {
    backend: T,
    shared: Arc<SharedInputSources>,
    requests: mpsc::Receiver<SelectRequest>,
    ticks: AtomicU32,
}

impl<T: InputSourceTracker> InputSourcePump<T> {
    /// Apply queued selections, then refresh the mirrored state.
    pub fn tick(&self) {
        while let Ok(request) = self.requests.try_recv() {
            let result = self.backend.select(&request.source);
            if result.is_ok() {
                self.shared.store_current(request.source.clone());
            }
            // The caller may have timed out already
            let _ = request.reply.send(result);
        }

        match self.backend.current() {
            Ok(source) => self.shared.store_current(source),
            Err(e) => tracing::trace!(error = %e, "input source read failed"),
        }

        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        if self.shared.refresh.swap(false, Ordering::SeqCst) || tick % LIST_REFRESH_TICKS == 0 {
            self.shared.store_installed(self.backend.list());
        }
    }

    pub fn shared(&self) -> Arc<SharedInputSources> {
        Arc::clone(&self.shared)
    }
}

/// Split `backend` into a pump for its owning thread and a shared view.
///
/// The view starts empty until the first [`InputSourcePump::tick`].
pub fn shared_input_sources<T: InputSourceTracker>(
    backend: T,
) -> (InputSourcePump<T>, Arc<SharedInputSources>) {
    shared_input_sources_with_timeout(backend, SELECT_TIMEOUT)
}

pub fn shared_input_sources_with_timeout<T: InputSourceTracker>(
    backend: T,
    select_timeout: Duration,
) -> (InputSourcePump<T>, Arc<SharedInputSources>) {
    let (tx, rx) = mpsc::channel();
    let shared = Arc::new(SharedInputSources {
        current: RwLock::new(None),
        installed: RwLock::new(Vec::new()),
        requests: Mutex::new(tx),
        refresh: AtomicBool::new(false),
        select_timeout,
    });
    let pump = InputSourcePump {
        backend,
        shared: Arc::clone(&shared),
        requests: rx,
        ticks: AtomicU32::new(0),
    };
    (pump, shared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryInputSourceTracker;
    use std::thread;

    fn sources() -> Vec<InputSource> {
        vec![
            InputSource::new("abc", "ABC", false),
            InputSource::new("pinyin", "Pinyin", true),
        ]
    }

    #[test]
    fn test_empty_until_first_tick() {
        let (pump, shared) = shared_input_sources(MemoryInputSourceTracker::new(sources()));

        assert!(matches!(shared.current(), Err(InputSourceError::Unavailable)));
        assert!(shared.list().is_empty());

        pump.tick();

        assert_eq!(shared.current().unwrap().id, "abc");
        assert_eq!(shared.list().len(), 2);
        assert_eq!(shared.find("pinyin").unwrap().name, "Pinyin");
    }

    #[test]
    fn test_tick_mirrors_outside_changes() {
        let backend = Arc::new(MemoryInputSourceTracker::new(sources()));
        let (pump, shared) = shared_input_sources(Arc::clone(&backend));
        pump.tick();

        backend.set_current(InputSource::new("pinyin", "Pinyin", true));
        assert_eq!(shared.current().unwrap().id, "abc", "stale until the next tick");

        pump.tick();
        assert_eq!(shared.current().unwrap().id, "pinyin");
    }

    #[test]
    fn test_select_runs_on_pump_thread() {
        let backend = Arc::new(MemoryInputSourceTracker::new(sources()));
        let (pump, shared) = shared_input_sources(Arc::clone(&backend));
        pump.tick();

        let stop = Arc::new(AtomicBool::new(false));
        let stop_pump = Arc::clone(&stop);
        let pump_thread = thread::spawn(move || {
            while !stop_pump.load(Ordering::SeqCst) {
                pump.tick();
                thread::sleep(Duration::from_millis(5));
            }
        });

        let pinyin = shared.find("pinyin").unwrap();
        shared.select(&pinyin).unwrap();
        let missing = shared.select(&InputSource::new("kotoeri", "Japanese", true));

        stop.store(true, Ordering::SeqCst);
        pump_thread.join().unwrap();

        assert_eq!(backend.selections(), vec!["pinyin"]);
        assert_eq!(shared.current().unwrap().id, "pinyin");
        assert!(matches!(missing, Err(InputSourceError::NotInstalled(_))));
    }

    #[test]
    fn test_select_without_pump_times_out() {
        let (_pump, shared) = shared_input_sources_with_timeout(
            MemoryInputSourceTracker::new(sources()),
            Duration::from_millis(20),
        );

        let result = shared.select(&InputSource::new("abc", "ABC", false));
        assert!(matches!(result, Err(InputSourceError::NoResponse(_))));
    }

    #[test]
    fn test_refresh_request_rereads_list() {
        let (pump, shared) = shared_input_sources(MemoryInputSourceTracker::new(sources()));
        pump.tick();
        shared.store_installed(Vec::new());

        pump.tick();
        assert!(shared.list().is_empty(), "list is only re-read periodically");

        shared.request_refresh();
        pump.tick();
        assert_eq!(shared.list().len(), 2);
    }
}

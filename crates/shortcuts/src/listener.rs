//! Global chord listener.
//!
//! Uses `device_query` (polling) instead of event hooks: hook libraries call
//! `TSMCurrentKeyboardInputSourceRefCreate` off the main queue, which
//! triggers `dispatch_assert_queue_fail` on recent macOS.
//!
//! Polling at 50ms is enough for human key presses (usually >100ms) and
//! costs negligible CPU.

use crate::chord::Shortcut;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Polling interval for key state.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Source of currently held keys.
pub trait KeyState {
    fn pressed_keys(&self) -> Vec<Keycode>;
}

impl KeyState for DeviceState {
    fn pressed_keys(&self) -> Vec<Keycode> {
        self.get_keys()
    }
}

/// Rising-edge detection over a set of chords.
#[derive(Debug)]
pub struct ChordTracker {
    shortcuts: Vec<Shortcut>,
    held: Vec<bool>,
}

impl ChordTracker {
    pub fn new(shortcuts: Vec<Shortcut>) -> Self {
        let held = vec![false; shortcuts.len()];
        Self { shortcuts, held }
    }

    /// Indices of chords that became fully pressed since the last update.
    pub fn update(&mut self, pressed: &[Keycode]) -> Vec<usize> {
        let mut fired = Vec::new();
        for (index, shortcut) in self.shortcuts.iter().enumerate() {
            let is_pressed = shortcut.is_pressed(pressed);
            if is_pressed && !self.held[index] {
                fired.push(index);
            }
            self.held[index] = is_pressed;
        }
        fired
    }
}

/// Handle to control the chord listener.
pub struct ChordListenerHandle {
    running: Arc<AtomicBool>,
}

impl ChordListenerHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ChordListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start polling global key state for `shortcuts`.
///
/// `on_chord` receives the index of each chord on its rising edge.
pub fn start_chord_listener<F>(shortcuts: Vec<Shortcut>, on_chord: F) -> ChordListenerHandle
where
    F: Fn(usize) + Send + 'static,
{
    start_chord_listener_with(shortcuts, DeviceState::new, POLL_INTERVAL, on_chord)
}

/// Like [`start_chord_listener`] with an explicit key state source.
///
/// The source is created on the polling thread.
pub fn start_chord_listener_with<K, M, F>(
    shortcuts: Vec<Shortcut>,
    make_state: M,
    interval: Duration,
    on_chord: F,
) -> ChordListenerHandle
where
    K: KeyState,
    M: FnOnce() -> K + Send + 'static,
    F: Fn(usize) + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    std::thread::spawn(move || {
        let state = make_state();
        let mut tracker = ChordTracker::new(shortcuts);

        while running_clone.load(Ordering::SeqCst) {
            for index in tracker.update(&state.pressed_keys()) {
                tracing::trace!(index, "Chord pressed");
                on_chord(index);
            }
            std::thread::sleep(interval);
        }
    });

    ChordListenerHandle { running }
}

//! Per-keystroke substitution logic run inside the tap callback.

use crate::event::{KeyEvent, Replacement};
use crate::keymap::MonitoredKeyMap;
use crate::read_cache::InputSourceReadCache;
use keyshift_input_source::InputSourceTracker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Decides, per key-down, whether to replace CJKV punctuation with ASCII.
///
/// Everything here is a table lookup plus at most one input source read
/// bounded by the read cache; the OS disables taps whose callbacks stall.
pub struct KeyDownHandler {
    active: AtomicBool,
    keymap: MonitoredKeyMap,
    cache: InputSourceReadCache,
    tracker: Arc<dyn InputSourceTracker>,
}

impl KeyDownHandler {
    pub fn new(tracker: Arc<dyn InputSourceTracker>) -> Self {
        Self::with_cache(tracker, InputSourceReadCache::default())
    }

    pub fn with_cache(tracker: Arc<dyn InputSourceTracker>, cache: InputSourceReadCache) -> Self {
        Self {
            active: AtomicBool::new(false),
            keymap: MonitoredKeyMap,
            cache,
            tracker,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub(crate) fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Event to deliver in place of `event`, or `None` to deliver it unchanged.
    ///
    /// Never blocks the keystroke: any synthesis failure delivers the original.
    pub fn handle_key_down<E: KeyEvent>(&self, event: &E) -> Option<E::Output> {
        if !self.is_active() {
            return None;
        }

        let key_code = event.key_code();
        let text = self.keymap.replacement(key_code, event.modifiers())?;

        let source = self.cache.get_or_read(|| self.tracker.current().ok())?;
        if !source.is_cjkv {
            return None;
        }

        self.substitute(event, key_code, text)
    }

    fn substitute<E: KeyEvent>(&self, event: &E, key_code: u16, text: &'static str) -> Option<E::Output> {
        let replacement = Replacement {
            key_code,
            text,
            timestamp: event.timestamp(),
        };
        match event.synthesize(&replacement) {
            Ok(output) => {
                tracing::trace!(key_code, text, "substituted punctuation");
                Some(output)
            }
            Err(e) => {
                tracing::trace!(key_code, error = %e, "synthesis failed, passing key through");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use crate::error::{InputError, Result};
    use crate::event::{KeyEvent, Modifiers, Replacement};

    /// Key event recorded entirely in memory.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FakeKeyEvent {
        pub key_code: u16,
        pub modifiers: Modifiers,
        pub timestamp: u64,
        pub text: Option<String>,
        pub fail_synthesis: bool,
    }

    impl FakeKeyEvent {
        pub fn new(key_code: u16, timestamp: u64) -> Self {
            Self {
                key_code,
                modifiers: Modifiers::NONE,
                timestamp,
                text: None,
                fail_synthesis: false,
            }
        }

        pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
            self.modifiers = modifiers;
            self
        }
    }

    impl KeyEvent for FakeKeyEvent {
        type Output = FakeKeyEvent;

        fn key_code(&self) -> u16 {
            self.key_code
        }

        fn modifiers(&self) -> Modifiers {
            self.modifiers
        }

        fn timestamp(&self) -> u64 {
            self.timestamp
        }

        fn synthesize(&self, replacement: &Replacement) -> Result<FakeKeyEvent> {
            if self.fail_synthesis {
                return Err(InputError::EventSynthesis("no event source".to_string()));
            }
            Ok(FakeKeyEvent {
                key_code: replacement.key_code,
                modifiers: Modifiers::NONE,
                timestamp: replacement.timestamp,
                text: Some(replacement.text.to_string()),
                fail_synthesis: false,
            })
        }
    }
}

//! Punctuation engine lifecycle: `Disabled` <-> `Active`.

use crate::error::{InputError, Result};
use crate::handler::KeyDownHandler;
use crate::permissions::PermissionProbe;
use crate::tap::{TapBackend, TapRegistration, TAP_PLACEMENTS};
use keyshift_input_source::InputSourceTracker;
use keyshift_rules::AppRule;
use std::sync::{Arc, Mutex, MutexGuard};

/// Whether an app's rule asks for ASCII punctuation.
pub fn should_enable_for_app(rule: Option<&AppRule>) -> bool {
    rule.is_some_and(|r| r.force_english_punctuation)
}

/// Owns the keyboard tap and the shared key-down handler.
///
/// `enable` and `disable` are idempotent and only make direct synchronous
/// system calls, so they are safe from any thread, including during drop.
pub struct PunctuationEngine {
    backend: Box<dyn TapBackend>,
    probe: Arc<dyn PermissionProbe>,
    handler: Arc<KeyDownHandler>,
    registration: Mutex<Option<Box<dyn TapRegistration>>>,
}

impl PunctuationEngine {
    pub fn new(
        backend: Box<dyn TapBackend>,
        probe: Arc<dyn PermissionProbe>,
        tracker: Arc<dyn InputSourceTracker>,
    ) -> Self {
        Self::with_handler(backend, probe, Arc::new(KeyDownHandler::new(tracker)))
    }

    pub fn with_handler(
        backend: Box<dyn TapBackend>,
        probe: Arc<dyn PermissionProbe>,
        handler: Arc<KeyDownHandler>,
    ) -> Self {
        Self {
            backend,
            probe,
            handler,
            registration: Mutex::new(None),
        }
    }

    fn registration(&self) -> MutexGuard<'_, Option<Box<dyn TapRegistration>>> {
        self.registration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.registration().is_some()
    }

    pub fn handler(&self) -> Arc<KeyDownHandler> {
        Arc::clone(&self.handler)
    }

    /// Install the tap. No-op when already active.
    ///
    /// The permission probe is advisory; tap creation is the real check.
    pub fn enable(&self) -> Result<()> {
        let mut registration = self.registration();
        if registration.is_some() {
            return Ok(());
        }

        let permitted = self.probe.check_input_monitoring(false);
        if !permitted {
            tracing::debug!("Input monitoring probe negative, trying tap anyway");
        }

        let mut last_error = None;
        for placement in TAP_PLACEMENTS {
            match self.backend.install(placement, Arc::clone(&self.handler)) {
                Ok(tap) => {
                    *registration = Some(tap);
                    self.handler.set_active(true);
                    tracing::info!(?placement, "Punctuation tap enabled");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(?placement, error = %e, "Tap placement failed");
                    last_error = Some(e);
                }
            }
        }

        tracing::warn!("Could not create punctuation tap");
        match last_error {
            Some(InputError::Unsupported) => Err(InputError::Unsupported),
            _ if !permitted => Err(InputError::PermissionDenied),
            Some(e) => Err(e),
            None => Err(InputError::TapCreation("no tap placement available".to_string())),
        }
    }

    /// Remove the tap and drop the cached input source. No-op when disabled.
    pub fn disable(&self) {
        self.handler.set_active(false);
        let tap = self.registration().take();
        if let Some(tap) = tap {
            tap.remove();
            tracing::info!("Punctuation tap disabled");
        }
        self.handler.clear_cache();
    }
}

impl Drop for PunctuationEngine {
    fn drop(&mut self) {
        self.disable();
    }
}

//! Permission checks for global keyboard interception.

/// Reports whether the process may observe and post keyboard events.
pub trait PermissionProbe: Send + Sync {
    /// Input Monitoring (listen to keyboard events system-wide).
    fn check_input_monitoring(&self, prompt: bool) -> bool;

    /// Accessibility (post or modify events for other apps).
    fn check_accessibility(&self, prompt: bool) -> bool;
}

/// Probe that always reports access; used where no permission model exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrantedProbe;

impl PermissionProbe for GrantedProbe {
    fn check_input_monitoring(&self, _prompt: bool) -> bool {
        true
    }

    fn check_accessibility(&self, _prompt: bool) -> bool {
        true
    }
}

//! Error types for keystroke interception.

use thiserror::Error;

/// Errors that can occur while installing the tap or rewriting events.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input monitoring permission not granted (macOS).
    #[error("input monitoring permission not granted - open System Settings > Privacy & Security > Input Monitoring")]
    PermissionDenied,

    /// Every tap configuration was rejected by the system.
    #[error("failed to create keyboard event tap: {0}")]
    TapCreation(String),

    /// A replacement key event could not be built.
    #[error("failed to synthesize key event: {0}")]
    EventSynthesis(String),

    /// No event tap backend exists for this platform.
    #[error("keyboard event taps are not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, InputError>;

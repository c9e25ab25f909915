//! Platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
mod notify;

#[cfg(target_os = "macos")]
pub use macos::MacOSProvider;
#[cfg(target_os = "macos")]
pub use notify::SystemObserver;

// Re-export the appropriate provider for the current platform
#[cfg(target_os = "macos")]
pub type PlatformProvider = MacOSProvider;

#[cfg(not(target_os = "macos"))]
pub type PlatformProvider = crate::provider::StaticContextTracker;

/// No system notifications are delivered on this platform.
#[cfg(not(target_os = "macos"))]
pub struct SystemObserver;

#[cfg(not(target_os = "macos"))]
impl SystemObserver {
    pub fn register(_callback: crate::notifications::NotificationCallback) -> Self {
        tracing::debug!("System notifications not supported on this platform");
        Self
    }
}

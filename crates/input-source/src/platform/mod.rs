//! Platform-specific implementations.

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::{MacInputSourceTracker, RunLoopPump};

#[cfg(target_os = "macos")]
pub type PlatformTracker = MacInputSourceTracker;

#[cfg(not(target_os = "macos"))]
pub type PlatformTracker = crate::tracker::MemoryInputSourceTracker;

//! Session and input source notifications posted by the system.

use std::sync::Arc;

/// A system notification that should make the switcher re-assert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemNotification {
    /// The screen was unlocked or the displays woke.
    ScreenUnlocked,
    /// The user's login session became active again (fast user switching).
    SessionActivated,
    /// Input sources were added, removed, enabled or disabled.
    InputSourcesChanged,
}

/// Distributed notification posted when the screen is unlocked.
pub const SCREEN_UNLOCKED: &str = "com.apple.screenIsUnlocked";

/// Distributed notification posted when the enabled input sources change.
pub const INPUT_SOURCES_CHANGED: &str =
    "com.apple.Carbon.TISNotifyEnabledKeyboardInputSourcesChanged";

pub const SCREENS_DID_WAKE: &str = "NSWorkspaceScreensDidWakeNotification";
pub const SESSION_DID_BECOME_ACTIVE: &str = "NSWorkspaceSessionDidBecomeActiveNotification";

impl SystemNotification {
    /// Map a notification name to the event it stands for.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SCREEN_UNLOCKED | SCREENS_DID_WAKE => Some(Self::ScreenUnlocked),
            SESSION_DID_BECOME_ACTIVE => Some(Self::SessionActivated),
            INPUT_SOURCES_CHANGED => Some(Self::InputSourcesChanged),
            _ => None,
        }
    }
}

/// Callback invoked on the thread that delivers the notification.
pub type NotificationCallback = Arc<dyn Fn(SystemNotification) + Send + Sync>;

//! Context awareness for keyshift.
//!
//! This crate tracks which application (and, inside a supported browser, which
//! website) currently has keyboard focus. It does not walk accessibility trees
//! or read browser tabs itself; website identity is pushed in by an external
//! detector and only consumed here.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  state.rs    - AppInfo, AppKind, ContextEvent               │
//! │  browser.rs  - Supported browser bundle IDs                 │
//! │  provider.rs - ContextTracker trait + in-memory trackers    │
//! │  notifications.rs - SystemNotification names                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  platform/macos.rs - NSWorkspace frontmost/running apps     │
//! │  platform/notify.rs - Unlock, session, input source notes   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  poller.rs - Background polling and change emission         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use keyshift_context::{ContextPoller, platform::PlatformProvider};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(PlatformProvider::new());
//! let mut poller = ContextPoller::new();
//!
//! poller.start(provider, Arc::new(|event| {
//!     println!("{:?}", event);
//! }));
//! ```

mod browser;
mod notifications;
mod poller;
mod provider;
mod state;

pub mod platform;

pub use browser::{is_browser, SUPPORTED_BROWSERS};
pub use notifications::{NotificationCallback, SystemNotification};
pub use poller::{ContextCallback, ContextPoller, DEFAULT_POLL_INTERVAL};
pub use provider::{ContextTracker, NullProvider, StaticContextTracker};
pub use state::{AppInfo, AppKind, ContextEvent, WebsiteContext};

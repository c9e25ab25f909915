//! Keystroke interception for keyshift.
//!
//! Installs a system-wide, event-modifying keyboard tap and, while the
//! focused app asks for ASCII punctuation and a CJKV input source is active,
//! replaces full-width punctuation keystrokes with their ASCII equivalents.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  enable/disable  ┌───────────────────┐
//! │ PunctuationEngine│─────────────────▶│ TapBackend        │
//! └────────┬─────────┘                  │ (CGEventTap)      │
//!          │ Arc                        └─────────┬─────────┘
//!          ▼                                      │ key-down
//! ┌──────────────────┐◀───────────────────────────┘
//! │ KeyDownHandler   │── MonitoredKeyMap (7 keys)
//! │                  │── InputSourceReadCache (500 ms)
//! └──────────────────┘
//! ```
//!
//! Every failure on the key-down path delivers the original event.

mod engine;
mod error;
mod event;
mod handler;
mod keymap;
mod permissions;
mod read_cache;
mod tap;

pub mod platform;

pub use engine::{should_enable_for_app, PunctuationEngine};
pub use error::{InputError, Result};
pub use event::{KeyEvent, Modifiers, Replacement};
pub use handler::KeyDownHandler;
pub use keymap::{keycode, MonitoredKey, MonitoredKeyMap, MONITORED_KEYS};
pub use permissions::{GrantedProbe, PermissionProbe};
pub use read_cache::{InputSourceReadCache, READ_CACHE_TTL};
pub use tap::{TapBackend, TapPlacement, TapRegistration, TAP_PLACEMENTS};

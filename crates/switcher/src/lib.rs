//! Context-aware input source switching for keyshift.
//!
//! A single-writer reducer turns an ordered stream of actions (focus
//! changes, input source changes, shortcuts) into a deduplicated sequence of
//! published states. Each published state writes the per-app cache, toggles
//! punctuation substitution for the focused app, and is emitted on the
//! event bus.
//!
//! ```text
//! ContextPoller ─┐
//! InputSourcePoller ─┼─▶ ActionSender ─▶ [bounded queue] ─▶ SwitchingService
//! ShortcutDispatcher ┘                                     │ reduce → select
//!                                                           │ publish → cache,
//!                                                           │   punctuation, bus
//! ```

mod action;
mod error;
mod punctuation;
mod reducer;
mod sender;
mod service;
mod state;

pub use action::{Action, Command, SystemEvent};
pub use error::{Result, SwitcherError};
pub use punctuation::PunctuationControl;
pub use reducer::{reduce, Reduction, Resolved};
pub use sender::ActionSender;
pub use service::{SwitchingService, DEFAULT_QUEUE_CAPACITY};
pub use state::{ChangeReason, State};

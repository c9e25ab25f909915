//! Global shortcuts for keyshift.
//!
//! A shortcut is a key chord bound either to one input source or to a named
//! [`InputSourceGroup`] that cycles on each press. The
//! [`ShortcutDispatcher`] resolves triggered chords to an [`InputSource`]
//! and hands it to the switching service.
//!
//! [`InputSource`]: keyshift_input_source::InputSource

mod chord;
mod dispatcher;
mod error;
mod group;
mod listener;

pub use chord::{ChordKey, Shortcut};
pub use dispatcher::{ShortcutBinding, ShortcutDispatcher, ShortcutTarget, TriggerCallback};
pub use error::{Result, ShortcutError};
pub use group::InputSourceGroup;
pub use listener::{
    start_chord_listener, start_chord_listener_with, ChordListenerHandle, ChordTracker, KeyState,
    POLL_INTERVAL,
};

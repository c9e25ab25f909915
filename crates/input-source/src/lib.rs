//! Keyboard input source tracking for keyshift.
//!
//! Exposes the active input source, the list of selectable sources, a way to
//! select one, and a polling change stream. On macOS the system API is
//! confined to the main thread through [`InputSourcePump`]; other threads
//! use the mirrored [`SharedInputSources`]. Each source carries a CJKV flag
//! that tells the punctuation engine whether it emits full-width punctuation.

mod error;
mod poller;
mod shared;
mod source;
mod tracker;

pub mod platform;

pub use error::{InputSourceError, Result};
pub use poller::{InputSourceCallback, InputSourcePoller, DEFAULT_POLL_INTERVAL};
pub use shared::{
    shared_input_sources, shared_input_sources_with_timeout, InputSourcePump, SharedInputSources,
    LIST_REFRESH_TICKS, SELECT_TIMEOUT,
};
pub use source::{is_cjkv_language, InputSource, CJKV_LANGUAGES};
pub use tracker::{InputSourceTracker, MemoryInputSourceTracker};

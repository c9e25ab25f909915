//! Platform-neutral view of a key-down event.

use crate::error::Result;

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        option: false,
        command: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    pub(crate) fn has_command_like(&self) -> bool {
        self.control || self.option || self.command
    }
}

/// Fields of the key-down event that replaces an intercepted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replacement {
    pub key_code: u16,
    pub text: &'static str,
    pub timestamp: u64,
}

/// A key-down event delivered by the tap.
pub trait KeyEvent {
    /// Event type the tap delivers in place of the original.
    type Output;

    fn key_code(&self) -> u16;
    fn modifiers(&self) -> Modifiers;
    fn timestamp(&self) -> u64;

    /// Build a new key-down carrying `replacement`, with no modifier flags.
    fn synthesize(&self, replacement: &Replacement) -> Result<Self::Output>;
}

//! Seam between the engine and the OS event tap.

use crate::error::Result;
use crate::handler::KeyDownHandler;
use std::sync::Arc;

/// Where the tap sits in the event chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapPlacement {
    Head,
    Tail,
}

/// Placements tried by the engine, in order.
pub const TAP_PLACEMENTS: [TapPlacement; 2] = [TapPlacement::Head, TapPlacement::Tail];

/// Creates event-modifying keyboard taps.
pub trait TapBackend: Send + Sync {
    /// Install a key-down tap that routes every event through `handler`.
    fn install(
        &self,
        placement: TapPlacement,
        handler: Arc<KeyDownHandler>,
    ) -> Result<Box<dyn TapRegistration>>;
}

/// A live tap. Owns everything the callback touches.
pub trait TapRegistration: Send {
    /// Turn the tap off and release it. Synchronous.
    fn remove(self: Box<Self>);
}

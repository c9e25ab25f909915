use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwitcherError {
    /// The switching service stopped and no longer accepts commands.
    #[error("switching service is not running")]
    QueueClosed,

    /// No input source could be read or listed at startup.
    #[error("no keyboard input source available")]
    NoInputSource,

    #[error("action queue full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, SwitcherError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("unknown key name: {0}")]
    UnknownKey(String),
    #[error("shortcut has no keys")]
    EmptyChord,
    #[error("shortcut needs a non-modifier key: {0}")]
    ModifiersOnly(String),
    #[error("unknown input source group: {0}")]
    UnknownGroup(String),
    #[error("input source group has no installed sources: {0}")]
    EmptyGroup(String),
    #[error("input source not installed: {0}")]
    NotInstalled(String),
}

pub type Result<T> = std::result::Result<T, ShortcutError>;

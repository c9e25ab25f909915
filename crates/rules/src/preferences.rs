use crate::rule::Result;
use serde::{Deserialize, Serialize};

/// Which input source to select when refocusing a previously visited app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStrategy {
    /// Restore the input source last used in that app.
    #[default]
    RestorePrevious,
    /// Apply the configured default input source.
    UseDefault,
}

/// Global switching preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(default)]
    pub restore_strategy: RestoreStrategy,
    #[serde(default)]
    pub default_input_source_id: Option<String>,
}

impl Preferences {
    pub fn restores_previous(&self) -> bool {
        self.restore_strategy == RestoreStrategy::RestorePrevious
    }
}

/// Persistence for [`Preferences`].
pub trait PreferenceRepository: Send + Sync {
    fn load_preferences(&self) -> Result<Preferences>;
    fn save_preferences(&self, preferences: &Preferences) -> Result<()>;
}

//! Daemon configuration file.

use anyhow::Context;
use keyshift_shortcuts::{InputSourceGroup, ShortcutBinding};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "KEYSHIFT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// SQLite file holding app rules and preferences.
    pub database_path: PathBuf,
    pub context_poll_interval_ms: u64,
    pub input_source_poll_interval_ms: u64,
    /// How often the main thread refreshes the mirrored input source.
    pub input_source_pump_interval_ms: u64,
    pub preferences_poll_interval_ms: u64,
    pub action_queue_capacity: usize,
    pub shortcuts: Vec<ShortcutBinding>,
    pub groups: Vec<InputSourceGroup>,
    /// Ask macOS for Input Monitoring and Accessibility at startup.
    pub prompt_for_permissions: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            context_poll_interval_ms: 250,
            input_source_poll_interval_ms: 250,
            input_source_pump_interval_ms: 50,
            preferences_poll_interval_ms: 2000,
            action_queue_capacity: keyshift_switcher::DEFAULT_QUEUE_CAPACITY,
            shortcuts: Vec::new(),
            groups: Vec::new(),
            prompt_for_permissions: true,
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyshift")
        .join("keyshift.db")
}

/// `$KEYSHIFT_CONFIG`, else `<config dir>/keyshift/config.json`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("keyshift").join("config.json"))
}

impl DaemonConfig {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> anyhow::Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn context_poll_interval(&self) -> Duration {
        Duration::from_millis(self.context_poll_interval_ms.max(10))
    }

    pub fn input_source_poll_interval(&self) -> Duration {
        Duration::from_millis(self.input_source_poll_interval_ms.max(10))
    }

    pub fn input_source_pump_interval(&self) -> Duration {
        Duration::from_millis(self.input_source_pump_interval_ms.max(10))
    }

    pub fn preferences_poll_interval(&self) -> Duration {
        Duration::from_millis(self.preferences_poll_interval_ms.max(100))
    }
}

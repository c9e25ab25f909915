use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Errors surfaced by rule and preference stores.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rule store unavailable: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("rule store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// Repository trait for per-app rules.
/// Implemented by storage layer, allowing the switching logic to remain decoupled.
pub trait AppRuleStore: Send + Sync {
    fn rule_for(&self, bundle_id: &str) -> Result<Option<AppRule>>;
    fn save_rule(&self, rule: &AppRule) -> Result<()>;
    fn delete_rule(&self, bundle_id: &str) -> Result<()>;
    fn list_rules(&self) -> Result<Vec<AppRule>>;
}

/// User-defined behavior for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRule {
    pub bundle_id: String,
    /// Input source to select whenever the app gains focus.
    #[serde(default)]
    pub forced_input_source_id: Option<String>,
    /// Restore the last-used input source even when the global strategy
    /// applies the default.
    #[serde(default)]
    pub do_restore_keyboard: bool,
    /// Never restore or default for this app.
    #[serde(default)]
    pub do_not_restore_keyboard: bool,
    #[serde(default)]
    pub hide_indicator: bool,
    /// Replace CJKV punctuation with ASCII while this app is focused.
    #[serde(default)]
    pub force_english_punctuation: bool,
}

impl AppRule {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            forced_input_source_id: None,
            do_restore_keyboard: false,
            do_not_restore_keyboard: false,
            hide_indicator: false,
            force_english_punctuation: false,
        }
    }

    pub fn forcing(mut self, input_source_id: impl Into<String>) -> Self {
        self.forced_input_source_id = Some(input_source_id.into());
        self
    }

    pub fn with_english_punctuation(mut self) -> Self {
        self.force_english_punctuation = true;
        self
    }
}

/// In-memory rule store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<HashMap<String, AppRule>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: impl IntoIterator<Item = AppRule>) -> Self {
        Self {
            rules: RwLock::new(
                rules
                    .into_iter()
                    .map(|r| (r.bundle_id.clone(), r))
                    .collect(),
            ),
        }
    }
}

impl AppRuleStore for MemoryRuleStore {
    fn rule_for(&self, bundle_id: &str) -> Result<Option<AppRule>> {
        let rules = self.rules.read().map_err(|_| RuleError::Poisoned)?;
        Ok(rules.get(bundle_id).cloned())
    }

    fn save_rule(&self, rule: &AppRule) -> Result<()> {
        let mut rules = self.rules.write().map_err(|_| RuleError::Poisoned)?;
        rules.insert(rule.bundle_id.clone(), rule.clone());
        Ok(())
    }

    fn delete_rule(&self, bundle_id: &str) -> Result<()> {
        let mut rules = self.rules.write().map_err(|_| RuleError::Poisoned)?;
        rules.remove(bundle_id);
        Ok(())
    }

    fn list_rules(&self) -> Result<Vec<AppRule>> {
        let rules = self.rules.read().map_err(|_| RuleError::Poisoned)?;
        let mut all: Vec<AppRule> = rules.values().cloned().collect();
        all.sort_by(|a, b| a.bundle_id.cmp(&b.bundle_id));
        Ok(all)
    }
}

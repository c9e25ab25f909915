//! Effective input source resolution for a focused app.

use crate::cache::AppCache;
use crate::preferences::Preferences;
use crate::rule::{AppRule, AppRuleStore};
use keyshift_context::AppKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why a resolution picked its input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The app's rule forces this input source.
    Rule,
    /// Restored from the per-app cache.
    Cache,
    /// The configured default input source.
    Default,
}

/// Input source an app should switch to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub input_source_id: String,
    pub source: ResolutionSource,
}

/// Resolves rules, cache and preferences into one answer per app.
///
/// Owns the per-app cache; callers serialize access (the switching service
/// is the single writer).
pub struct Resolver {
    store: Arc<dyn AppRuleStore>,
    cache: AppCache,
    preferences: Preferences,
}

impl Resolver {
    pub fn new(store: Arc<dyn AppRuleStore>, preferences: Preferences) -> Self {
        Self {
            store,
            cache: AppCache::new(),
            preferences,
        }
    }

    /// Look up the rule for an app. Store failures count as "no rule".
    pub fn rule_for(&self, bundle_id: &str) -> Option<AppRule> {
        match self.store.rule_for(bundle_id) {
            Ok(rule) => rule,
            Err(e) => {
                tracing::warn!(app = %bundle_id, error = %e, "Rule lookup failed, treating as no rule");
                None
            }
        }
    }

    /// Resolve the effective input source for `kind`.
    ///
    /// Precedence: forced rule, then cache (restore strategy or the rule's
    /// restore flag), then the default input source. A rule with
    /// `do_not_restore_keyboard` only ever yields its forced source.
    pub fn resolve(&self, kind: &AppKind) -> Option<Resolution> {
        let rule = self.rule_for(kind.bundle_id());

        if let Some(id) = rule.as_ref().and_then(|r| r.forced_input_source_id.clone()) {
            return Some(Resolution {
                input_source_id: id,
                source: ResolutionSource::Rule,
            });
        }

        if rule.as_ref().is_some_and(|r| r.do_not_restore_keyboard) {
            return None;
        }

        let restore = self.preferences.restores_previous()
            || rule.as_ref().is_some_and(|r| r.do_restore_keyboard);

        if restore {
            if let Some(entry) = self.cache.get(kind) {
                return Some(Resolution {
                    input_source_id: entry.input_source_id.clone(),
                    source: ResolutionSource::Cache,
                });
            }
        }

        if !self.preferences.restores_previous() {
            if let Some(id) = self.preferences.default_input_source_id.clone() {
                return Some(Resolution {
                    input_source_id: id,
                    source: ResolutionSource::Default,
                });
            }
        }

        None
    }

    pub fn cache(&self) -> &AppCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AppCache {
        &mut self.cache
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Replace preferences. Turning "restore previous" off clears the cache.
    ///
    /// Returns `true` if the cache was cleared.
    pub fn set_preferences(&mut self, preferences: Preferences) -> bool {
        let cleared = self.preferences.restores_previous() && !preferences.restores_previous();
        if cleared {
            tracing::debug!(entries = self.cache.len(), "Restore disabled, clearing app cache");
            self.cache.clear();
        }
        self.preferences = preferences;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::RestoreStrategy;
    use crate::rule::{MemoryRuleStore, Result, RuleError};
    use keyshift_context::AppInfo;
    use keyshift_input_source::InputSource;

    fn kind(bundle_id: &str) -> AppKind {
        AppKind::app(AppInfo::new(bundle_id))
    }

    fn use_default(id: &str) -> Preferences {
        Preferences {
            restore_strategy: RestoreStrategy::UseDefault,
            default_input_source_id: Some(id.to_string()),
        }
    }

    struct BrokenStore;

    impl AppRuleStore for BrokenStore {
        fn rule_for(&self, _bundle_id: &str) -> Result<Option<AppRule>> {
            Err(RuleError::Poisoned)
        }
        fn save_rule(&self, _rule: &AppRule) -> Result<()> {
            Err(RuleError::Poisoned)
        }
        fn delete_rule(&self, _bundle_id: &str) -> Result<()> {
            Err(RuleError::Poisoned)
        }
        fn list_rules(&self) -> Result<Vec<AppRule>> {
            Err(RuleError::Poisoned)
        }
    }

    #[test]
    fn test_forced_rule_beats_cache() {
        let store = Arc::new(MemoryRuleStore::with_rules([
            AppRule::new("com.apple.Terminal").forcing("abc")
        ]));
        let mut resolver = Resolver::new(store, Preferences::default());
        resolver
            .cache_mut()
            .write(&kind("com.apple.Terminal"), &InputSource::new("pinyin", "Pinyin", true));

        let resolution = resolver.resolve(&kind("com.apple.Terminal")).unwrap();
        assert_eq!(resolution.input_source_id, "abc");
        assert_eq!(resolution.source, ResolutionSource::Rule);
    }

    #[test]
    fn test_cache_restored_by_default_strategy() {
        let mut resolver = Resolver::new(Arc::new(MemoryRuleStore::new()), Preferences::default());
        resolver
            .cache_mut()
            .write(&kind("com.apple.Notes"), &InputSource::new("pinyin", "Pinyin", true));

        let resolution = resolver.resolve(&kind("com.apple.Notes")).unwrap();
        assert_eq!(resolution.input_source_id, "pinyin");
        assert_eq!(resolution.source, ResolutionSource::Cache);
    }

    #[test]
    fn test_miss_without_cache_or_default() {
        let resolver = Resolver::new(Arc::new(MemoryRuleStore::new()), Preferences::default());
        assert!(resolver.resolve(&kind("com.apple.Notes")).is_none());
    }

    #[test]
    fn test_default_strategy() {
        let resolver = Resolver::new(Arc::new(MemoryRuleStore::new()), use_default("abc"));
        let resolution = resolver.resolve(&kind("com.apple.Notes")).unwrap();
        assert_eq!(resolution.input_source_id, "abc");
        assert_eq!(resolution.source, ResolutionSource::Default);
    }

    #[test]
    fn test_rule_restore_flag_overrides_default_strategy() {
        let mut rule = AppRule::new("com.apple.Notes");
        rule.do_restore_keyboard = true;
        let mut resolver = Resolver::new(
            Arc::new(MemoryRuleStore::with_rules([rule])),
            use_default("abc"),
        );
        resolver
            .cache_mut()
            .write(&kind("com.apple.Notes"), &InputSource::new("pinyin", "Pinyin", true));

        let resolution = resolver.resolve(&kind("com.apple.Notes")).unwrap();
        assert_eq!(resolution.source, ResolutionSource::Cache);
    }

    #[test]
    fn test_do_not_restore_blocks_cache_and_default() {
        let mut rule = AppRule::new("com.apple.Notes");
        rule.do_not_restore_keyboard = true;
        let mut resolver = Resolver::new(
            Arc::new(MemoryRuleStore::with_rules([rule])),
            Preferences::default(),
        );
        resolver
            .cache_mut()
            .write(&kind("com.apple.Notes"), &InputSource::new("pinyin", "Pinyin", true));

        assert!(resolver.resolve(&kind("com.apple.Notes")).is_none());
    }

    #[test]
    fn test_store_failure_is_no_rule() {
        let resolver = Resolver::new(Arc::new(BrokenStore), use_default("abc"));
        assert!(resolver.rule_for("com.apple.Notes").is_none());
        let resolution = resolver.resolve(&kind("com.apple.Notes")).unwrap();
        assert_eq!(resolution.source, ResolutionSource::Default);
    }

    #[test]
    fn test_turning_restore_off_clears_cache() {
        let mut resolver = Resolver::new(Arc::new(MemoryRuleStore::new()), Preferences::default());
        resolver
            .cache_mut()
            .write(&kind("com.apple.Notes"), &InputSource::new("abc", "ABC", false));

        assert!(resolver.set_preferences(use_default("abc")));
        assert!(resolver.cache().is_empty());

        // Already off: nothing to clear
        assert!(!resolver.set_preferences(use_default("pinyin")));
    }
}

//! Per-app input source cache.

use chrono::{DateTime, Utc};
use keyshift_context::AppKind;
use keyshift_input_source::InputSource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last input source used in one app or website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Bundle ID, or `bundle|host` for a website.
    pub key: String,
    pub input_source_id: String,
    pub written_at: DateTime<Utc>,
}

/// Ephemeral mapping from app/website to its last-used input source.
#[derive(Debug, Default)]
pub struct AppCache {
    entries: HashMap<String, CacheEntry>,
}

impl AppCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, kind: &AppKind, source: &InputSource) {
        let key = kind.cache_key();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                input_source_id: source.id.clone(),
                written_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, kind: &AppKind) -> Option<&CacheEntry> {
        self.entries.get(&kind.cache_key())
    }

    /// Drop the app's entry and every website entry under it.
    pub fn remove(&mut self, bundle_id: &str) -> usize {
        let before = self.entries.len();
        let prefix = format!("{}|", bundle_id);
        self.entries
            .retain(|key, _| key != bundle_id && !key.starts_with(&prefix));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyshift_context::{AppInfo, WebsiteContext};

    fn safari_site(host: &str) -> AppKind {
        AppKind::website(
            AppInfo::new("com.apple.Safari"),
            WebsiteContext {
                host: Some(host.to_string()),
                address_bar_focused: false,
            },
        )
    }

    #[test]
    fn test_write_overwrites() {
        let mut cache = AppCache::new();
        let notes = AppKind::app(AppInfo::new("com.apple.Notes"));

        cache.write(&notes, &InputSource::new("abc", "ABC", false));
        cache.write(&notes, &InputSource::new("pinyin", "Pinyin", true));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&notes).unwrap().input_source_id, "pinyin");
    }

    #[test]
    fn test_remove_drops_websites_of_bundle() {
        let mut cache = AppCache::new();
        let source = InputSource::new("abc", "ABC", false);
        cache.write(&AppKind::app(AppInfo::new("com.apple.Safari")), &source);
        cache.write(&safari_site("github.com"), &source);
        cache.write(&AppKind::app(AppInfo::new("com.apple.SafariTechnologyPreview")), &source);

        assert_eq!(cache.remove("com.apple.Safari"), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = AppCache::new();
        cache.write(&safari_site("docs.rs"), &InputSource::new("abc", "ABC", false));
        cache.clear();
        assert!(cache.is_empty());
    }
}

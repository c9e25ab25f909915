//! Focused-context identity.

use serde::{Deserialize, Serialize};

/// Information about an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppInfo {
    /// Bundle ID (e.g., "com.microsoft.VSCode")
    pub bundle_id: String,

    /// Display name (e.g., "Visual Studio Code")
    pub name: Option<String>,
}

impl AppInfo {
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Localized name if known, bundle ID otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.bundle_id)
    }
}

/// Website focus reported by an external browser detector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebsiteContext {
    /// Lowercased host of the active tab (e.g., "github.com").
    pub host: Option<String>,

    /// Whether keyboard focus is in the browser's address bar.
    #[serde(default)]
    pub address_bar_focused: bool,
}

/// Identity of the focused context: an application, or a website inside a
/// supported browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppKind {
    pub app: AppInfo,

    /// Website host when `app` is a supported browser.
    #[serde(default)]
    pub host: Option<String>,

    /// Address-bar focus is treated as its own sub-context.
    #[serde(default)]
    pub address_bar_focused: bool,
}

impl AppKind {
    /// A plain application context.
    pub fn app(app: AppInfo) -> Self {
        Self {
            app,
            host: None,
            address_bar_focused: false,
        }
    }

    /// A website context inside a browser.
    pub fn website(app: AppInfo, website: WebsiteContext) -> Self {
        Self {
            app,
            host: website.host.map(|h| h.to_ascii_lowercase()),
            address_bar_focused: website.address_bar_focused,
        }
    }

    pub fn bundle_id(&self) -> &str {
        &self.app.bundle_id
    }

    /// App/website-aware equality.
    ///
    /// Display names are ignored. Hosts compare case-insensitively, and an
    /// address-bar-focused context never matches a page-focused one.
    pub fn is_same(&self, other: &AppKind) -> bool {
        if self.app.bundle_id != other.app.bundle_id {
            return false;
        }
        if self.address_bar_focused != other.address_bar_focused {
            return false;
        }
        match (&self.host, &other.host) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    /// Key used by the per-app cache: the bundle ID, or `bundle|host` for
    /// website contexts.
    pub fn cache_key(&self) -> String {
        match &self.host {
            Some(host) => format!("{}|{}", self.app.bundle_id, host),
            None => self.app.bundle_id.clone(),
        }
    }
}

/// Change emitted by the context poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContextEvent {
    /// A different app or website gained focus.
    Focused(AppKind),

    /// An application that was running is gone (bundle ID).
    Terminated(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safari() -> AppInfo {
        AppInfo::new("com.apple.Safari").with_name("Safari")
    }

    fn site(host: &str) -> WebsiteContext {
        WebsiteContext {
            host: Some(host.to_string()),
            address_bar_focused: false,
        }
    }

    #[test]
    fn test_same_app_ignores_name() {
        let a = AppKind::app(AppInfo::new("com.apple.Notes").with_name("Notes"));
        let b = AppKind::app(AppInfo::new("com.apple.Notes").with_name("Notizen"));
        assert!(a.is_same(&b));
    }

    #[test]
    fn test_different_bundles_differ() {
        let a = AppKind::app(AppInfo::new("com.apple.Notes"));
        let b = AppKind::app(AppInfo::new("com.apple.Terminal"));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_website_hosts_compared() {
        let a = AppKind::website(safari(), site("github.com"));
        let b = AppKind::website(safari(), site("GitHub.com"));
        let c = AppKind::website(safari(), site("docs.rs"));
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
    }

    #[test]
    fn test_address_bar_is_distinct_subcontext() {
        let page = AppKind::website(safari(), site("github.com"));
        let bar = AppKind::website(
            safari(),
            WebsiteContext {
                host: Some("github.com".to_string()),
                address_bar_focused: true,
            },
        );
        assert!(!page.is_same(&bar));
    }

    #[test]
    fn test_host_vs_no_host_differ() {
        let plain = AppKind::app(safari());
        let page = AppKind::website(safari(), site("github.com"));
        assert!(!plain.is_same(&page));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(AppKind::app(safari()).cache_key(), "com.apple.Safari");
        assert_eq!(
            AppKind::website(safari(), site("GitHub.com")).cache_key(),
            "com.apple.Safari|github.com"
        );
    }
}

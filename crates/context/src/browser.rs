//! Browsers whose focused website is tracked as its own context.

/// Bundle IDs of browsers that can report a website host.
pub const SUPPORTED_BROWSERS: &[&str] = &[
    "com.apple.Safari",
    "com.apple.SafariTechnologyPreview",
    "com.google.Chrome",
    "com.google.Chrome.canary",
    "org.chromium.Chromium",
    "com.microsoft.edgemac",
    "com.brave.Browser",
    "com.vivaldi.Vivaldi",
    "com.operasoftware.Opera",
    "company.thebrowser.Browser",
    "org.mozilla.firefox",
    "app.zen-browser.zen",
];

/// Check if a bundle ID belongs to a supported browser.
pub fn is_browser(bundle_id: &str) -> bool {
    SUPPORTED_BROWSERS.contains(&bundle_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_browser() {
        assert!(is_browser("com.apple.Safari"));
        assert!(is_browser("com.google.Chrome"));
    }

    #[test]
    fn test_non_browser() {
        assert!(!is_browser("com.apple.Terminal"));
        assert!(!is_browser(""));
    }
}

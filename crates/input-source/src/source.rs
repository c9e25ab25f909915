//! Input source identity and CJKV classification.

use serde::{Deserialize, Serialize};

/// Language prefixes whose input methods emit full-width/localized
/// punctuation by default.
pub const CJKV_LANGUAGES: &[&str] = &["zh", "ja", "ko", "vi"];

/// A keyboard input source (layout or input method).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSource {
    /// Stable identifier (e.g., "com.apple.keylayout.ABC")
    pub id: String,

    /// Human-readable name (e.g., "ABC")
    pub name: String,

    /// Whether this is a Chinese/Japanese/Korean/Vietnamese input method.
    pub is_cjkv: bool,
}

impl InputSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_cjkv: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_cjkv,
        }
    }

    /// Build from the system's language list, classifying by primary language.
    pub fn from_languages(
        id: impl Into<String>,
        name: impl Into<String>,
        languages: &[String],
    ) -> Self {
        let is_cjkv = languages
            .first()
            .map(|lang| is_cjkv_language(lang))
            .unwrap_or(false);
        Self::new(id, name, is_cjkv)
    }
}

/// Check if a BCP-47 language tag (e.g., "zh-Hans", "ja") is CJKV.
pub fn is_cjkv_language(tag: &str) -> bool {
    let primary = tag
        .split(|c| c == '-' || c == '_')
        .next()
        .unwrap_or_default();
    CJKV_LANGUAGES
        .iter()
        .any(|lang| primary.eq_ignore_ascii_case(lang))
}

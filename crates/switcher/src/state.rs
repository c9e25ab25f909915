use keyshift_context::AppKind;
use keyshift_input_source::InputSource;
use keyshift_rules::ResolutionSource;
use serde::{Deserialize, Serialize};

/// Why the current input source is what it is. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    NoChange,
    System,
    Shortcut,
    AppSpecified(ResolutionSource),
}

impl ChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeReason::NoChange => "no_change",
            ChangeReason::System => "system",
            ChangeReason::Shortcut => "shortcut",
            ChangeReason::AppSpecified(_) => "app_specified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub app: Option<AppKind>,
    pub input_source: InputSource,
    pub reason: ChangeReason,
}

impl State {
    pub fn initial(input_source: InputSource) -> Self {
        Self {
            app: None,
            input_source,
            reason: ChangeReason::NoChange,
        }
    }

    /// Same context and same input source id. `reason` is ignored.
    pub fn is_same(&self, other: &State) -> bool {
        let same_app = match (&self.app, &other.app) {
            (Some(a), Some(b)) => a.is_same(b),
            (None, None) => true,
            _ => false,
        };
        same_app && self.input_source.id == other.input_source.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyshift_context::{AppInfo, WebsiteContext};

    fn abc() -> InputSource {
        InputSource::new("abc", "ABC", false)
    }

    fn state(app: Option<AppKind>, source: InputSource, reason: ChangeReason) -> State {
        State {
            app,
            input_source: source,
            reason,
        }
    }

    #[test]
    fn test_reason_ignored_for_sameness() {
        let notes = Some(AppKind::app(AppInfo::new("com.apple.Notes")));
        let a = state(notes.clone(), abc(), ChangeReason::System);
        let b = state(notes, abc(), ChangeReason::Shortcut);
        assert!(a.is_same(&b));
    }

    #[test]
    fn test_none_app_only_matches_none() {
        let notes = Some(AppKind::app(AppInfo::new("com.apple.Notes")));
        let a = state(None, abc(), ChangeReason::NoChange);
        let b = state(notes, abc(), ChangeReason::NoChange);
        assert!(!a.is_same(&b));
        assert!(a.is_same(&a.clone()));
    }

    #[test]
    fn test_different_source_not_same() {
        let a = State::initial(abc());
        let b = State::initial(InputSource::new("pinyin", "Pinyin", true));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_address_bar_is_distinct_context() {
        let site = |focused| {
            Some(AppKind::website(
                AppInfo::new("com.apple.Safari"),
                WebsiteContext {
                    host: Some("github.com".into()),
                    address_bar_focused: focused,
                },
            ))
        };
        let a = state(site(false), abc(), ChangeReason::NoChange);
        let b = state(site(true), abc(), ChangeReason::NoChange);
        assert!(!a.is_same(&b));
    }
}

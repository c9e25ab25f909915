use serde::{Deserialize, Serialize};

/// Named, ordered set of input sources cycled by one shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSourceGroup {
    pub name: String,
    pub input_source_ids: Vec<String>,
}

impl InputSourceGroup {
    pub fn new(name: impl Into<String>, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            input_source_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// The installed id after `current` (wrapping), or the first installed id
    /// when `current` is not in the group.
    pub fn next_after<F>(&self, current: Option<&str>, is_installed: F) -> Option<&str>
    where
        F: Fn(&str) -> bool,
    {
        let installed: Vec<&str> = self
            .input_source_ids
            .iter()
            .map(String::as_str)
            .filter(|id| is_installed(id))
            .collect();

        let first = *installed.first()?;
        let Some(pos) = current.and_then(|c| installed.iter().position(|id| *id == c)) else {
            return Some(first);
        };
        Some(installed[(pos + 1) % installed.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> InputSourceGroup {
        InputSourceGroup::new("cjk", ["abc", "pinyin", "kotoeri"])
    }

    #[test]
    fn test_advances_and_wraps() {
        let group = group();
        assert_eq!(group.next_after(Some("abc"), |_| true), Some("pinyin"));
        assert_eq!(group.next_after(Some("kotoeri"), |_| true), Some("abc"));
    }

    #[test]
    fn test_outside_group_starts_at_first() {
        let group = group();
        assert_eq!(group.next_after(Some("dvorak"), |_| true), Some("abc"));
        assert_eq!(group.next_after(None, |_| true), Some("abc"));
    }

    #[test]
    fn test_skips_uninstalled() {
        let group = group();
        let installed = |id: &str| id != "pinyin";
        assert_eq!(group.next_after(Some("abc"), installed), Some("kotoeri"));
    }

    #[test]
    fn test_nothing_installed() {
        assert_eq!(group().next_after(Some("abc"), |_| false), None);
    }

    #[test]
    fn test_single_member_reasserts_itself() {
        let group = InputSourceGroup::new("solo", ["abc"]);
        assert_eq!(group.next_after(Some("abc"), |_| true), Some("abc"));
    }
}

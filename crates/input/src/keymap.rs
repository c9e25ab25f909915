//! Fixed table of punctuation keys watched by the tap.

use crate::event::Modifiers;

/// macOS virtual key codes (ANSI layout).
pub mod keycode {
    pub const RIGHT_BRACKET: u16 = 0x1E;
    pub const LEFT_BRACKET: u16 = 0x21;
    pub const QUOTE: u16 = 0x27;
    pub const SEMICOLON: u16 = 0x29;
    pub const COMMA: u16 = 0x2B;
    pub const PERIOD: u16 = 0x2F;
}

/// One watched key: physical key, whether Shift is held, ASCII output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoredKey {
    pub key_code: u16,
    pub shifted: bool,
    pub replacement: &'static str,
}

const fn key(key_code: u16, shifted: bool, replacement: &'static str) -> MonitoredKey {
    MonitoredKey {
        key_code,
        shifted,
        replacement,
    }
}

/// Punctuation keys and their ASCII replacements.
pub const MONITORED_KEYS: [MonitoredKey; 7] = [
    key(keycode::COMMA, false, ","),
    key(keycode::PERIOD, false, "."),
    key(keycode::SEMICOLON, false, ";"),
    key(keycode::QUOTE, false, "'"),
    key(keycode::QUOTE, true, "\""),
    key(keycode::LEFT_BRACKET, false, "["),
    key(keycode::RIGHT_BRACKET, false, "]"),
];

/// Lookup over [`MONITORED_KEYS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitoredKeyMap;

impl MonitoredKeyMap {
    /// ASCII replacement for a key press, if the key is watched.
    ///
    /// Chords with Control, Option or Command are shortcuts and never match.
    pub fn replacement(&self, key_code: u16, modifiers: Modifiers) -> Option<&'static str> {
        if modifiers.has_command_like() {
            return None;
        }
        MONITORED_KEYS
            .iter()
            .find(|k| k.key_code == key_code && k.shifted == modifiers.shift)
            .map(|k| k.replacement)
    }

    pub fn contains(&self, key_code: u16) -> bool {
        MONITORED_KEYS.iter().any(|k| k.key_code == key_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_punctuation() {
        let map = MonitoredKeyMap;
        assert_eq!(map.replacement(keycode::COMMA, Modifiers::NONE), Some(","));
        assert_eq!(map.replacement(keycode::PERIOD, Modifiers::NONE), Some("."));
        assert_eq!(map.replacement(keycode::LEFT_BRACKET, Modifiers::NONE), Some("["));
    }

    #[test]
    fn test_shift_quote_is_double_quote() {
        let map = MonitoredKeyMap;
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(map.replacement(keycode::QUOTE, shift), Some("\""));
        // Shift+comma is '<', not watched
        assert_eq!(map.replacement(keycode::COMMA, shift), None);
    }

    #[test]
    fn test_shortcut_chords_pass() {
        let map = MonitoredKeyMap;
        let cmd = Modifiers {
            command: true,
            ..Modifiers::NONE
        };
        assert_eq!(map.replacement(keycode::COMMA, cmd), None);
    }

    #[test]
    fn test_unwatched_key() {
        let map = MonitoredKeyMap;
        // 'a'
        assert_eq!(map.replacement(0x00, Modifiers::NONE), None);
        assert!(!map.contains(0x00));
        assert!(map.contains(keycode::QUOTE));
    }
}

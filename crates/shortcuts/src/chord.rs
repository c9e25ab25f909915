//! Key chords such as `ctrl+shift+1`.

use crate::error::{Result, ShortcutError};
use device_query::Keycode;
use std::fmt;

/// One part of a chord. Modifiers match either the left or right key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordKey {
    Control,
    Option,
    Command,
    Shift,
    Key(Keycode),
}

impl ChordKey {
    fn is_pressed(&self, pressed: &[Keycode]) -> bool {
        let any = |a: Keycode, b: Keycode| pressed.contains(&a) || pressed.contains(&b);
        match self {
            ChordKey::Control => any(Keycode::LControl, Keycode::RControl),
            ChordKey::Option => any(Keycode::LAlt, Keycode::RAlt),
            ChordKey::Command => any(Keycode::LMeta, Keycode::RMeta),
            ChordKey::Shift => any(Keycode::LShift, Keycode::RShift),
            ChordKey::Key(key) => pressed.contains(key),
        }
    }

    fn parse(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "ctrl" | "control" => return Ok(ChordKey::Control),
            "alt" | "opt" | "option" => return Ok(ChordKey::Option),
            "cmd" | "command" | "meta" | "super" => return Ok(ChordKey::Command),
            "shift" => return Ok(ChordKey::Shift),
            "space" => Keycode::Space,
            "tab" => Keycode::Tab,
            "esc" | "escape" => Keycode::Escape,
            "enter" | "return" => Keycode::Enter,
            "grave" | "`" => Keycode::Grave,
            "minus" | "-" => Keycode::Minus,
            "equal" | "=" => Keycode::Equal,
            "comma" | "," => Keycode::Comma,
            "period" | "dot" | "." => Keycode::Dot,
            "slash" | "/" => Keycode::Slash,
            "semicolon" | ";" => Keycode::Semicolon,
            other => letter_digit_or_function(other)
                .ok_or_else(|| ShortcutError::UnknownKey(name.to_string()))?,
        };
        Ok(ChordKey::Key(key))
    }
}

fn letter_digit_or_function(name: &str) -> Option<Keycode> {
    const LETTERS: [Keycode; 26] = [
        Keycode::A, Keycode::B, Keycode::C, Keycode::D, Keycode::E, Keycode::F,
        Keycode::G, Keycode::H, Keycode::I, Keycode::J, Keycode::K, Keycode::L,
        Keycode::M, Keycode::N, Keycode::O, Keycode::P, Keycode::Q, Keycode::R,
        Keycode::S, Keycode::T, Keycode::U, Keycode::V, Keycode::W, Keycode::X,
        Keycode::Y, Keycode::Z,
    ];
    const DIGITS: [Keycode; 10] = [
        Keycode::Key0, Keycode::Key1, Keycode::Key2, Keycode::Key3, Keycode::Key4,
        Keycode::Key5, Keycode::Key6, Keycode::Key7, Keycode::Key8, Keycode::Key9,
    ];
    const FUNCTION: [Keycode; 12] = [
        Keycode::F1, Keycode::F2, Keycode::F3, Keycode::F4, Keycode::F5, Keycode::F6,
        Keycode::F7, Keycode::F8, Keycode::F9, Keycode::F10, Keycode::F11, Keycode::F12,
    ];

    let bytes = name.as_bytes();
    match bytes {
        [c @ b'a'..=b'z'] => Some(LETTERS[(c - b'a') as usize]),
        [c @ b'0'..=b'9'] => Some(DIGITS[(c - b'0') as usize]),
        [b'f', rest @ ..] if !rest.is_empty() => {
            let n: usize = std::str::from_utf8(rest).ok()?.parse().ok()?;
            FUNCTION.get(n.checked_sub(1)?).copied()
        }
        _ => None,
    }
}

/// A global key chord bound to an input source or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    label: String,
    keys: Vec<ChordKey>,
}

impl Shortcut {
    /// Parse `+`-separated key names, e.g. `"ctrl+shift+1"`.
    ///
    /// At least one key must be a non-modifier.
    pub fn parse(text: &str) -> Result<Self> {
        let names: Vec<&str> = text.split('+').filter(|s| !s.trim().is_empty()).collect();
        Self::from_names(&names)
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(ShortcutError::EmptyChord);
        }
        let keys = names
            .iter()
            .map(|n| ChordKey::parse(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let label = names
            .iter()
            .map(|n| n.as_ref().trim().to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("+");

        if !keys.iter().any(|k| matches!(k, ChordKey::Key(_))) {
            return Err(ShortcutError::ModifiersOnly(label));
        }
        Ok(Self { label, keys })
    }

    pub fn keys(&self) -> &[ChordKey] {
        &self.keys
    }

    /// Every part of the chord is currently held.
    pub fn is_pressed(&self, pressed: &[Keycode]) -> bool {
        self.keys.iter().all(|k| k.is_pressed(pressed))
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

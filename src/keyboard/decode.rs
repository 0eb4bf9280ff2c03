//! Key event decoding
//!
//! Turns a key code and the modifier state into either the character the key
//! types or a named control token.

use super::keymap::{get_key_info, ControlKey, KeyClass, KeyCode, ParseKeyError};
use super::Modifiers;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Decoded meaning of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyToken {
    /// A printable character
    Char(char),
    /// A non-printing key
    Control(ControlKey),
}

impl KeyToken {
    pub fn is_printable(&self) -> bool {
        matches!(self, Self::Char(_))
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Control(key) if key.is_modifier())
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            Self::Control(_) => None,
        }
    }
}

impl From<char> for KeyToken {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<ControlKey> for KeyToken {
    fn from(key: ControlKey) -> Self {
        Self::Control(key)
    }
}

/// Characters print as themselves, control keys as `[Name]`
impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::Control(key) => write!(f, "[{}]", key),
        }
    }
}

impl FromStr for KeyToken {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Char(c));
        }
        s.strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| ParseKeyError(s.to_string()))?
            .parse::<ControlKey>()
            .map(Self::Control)
            .map_err(|_| ParseKeyError(s.to_string()))
    }
}

impl Serialize for KeyToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decode a key code under the given modifier state.
///
/// Returns `None` for codes missing from the keymap.
pub fn decode(code: KeyCode, modifiers: Modifiers) -> Option<KeyToken> {
    let token = match get_key_info(code).class {
        KeyClass::Letter(upper) if modifiers.shift => KeyToken::Char(upper),
        KeyClass::Letter(upper) => KeyToken::Char(upper.to_ascii_lowercase()),
        KeyClass::Symbol { shifted, .. } if modifiers.shift => KeyToken::Char(shifted),
        KeyClass::Symbol { base, .. } => KeyToken::Char(base),
        KeyClass::Keypad(c) => KeyToken::Char(c),
        KeyClass::Control(key) => KeyToken::Control(key),
        KeyClass::Unknown => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: u16) -> Option<KeyToken> {
        decode(KeyCode(code), Modifiers::NONE)
    }

    fn shifted(code: u16) -> Option<KeyToken> {
        decode(KeyCode(code), Modifiers::SHIFT)
    }

    #[test]
    fn letters_follow_shift() {
        assert_eq!(plain(65), Some(KeyToken::Char('a')));
        assert_eq!(shifted(65), Some(KeyToken::Char('A')));
        assert_eq!(plain(90), Some(KeyToken::Char('z')));
    }

    #[test]
    fn number_row_shifts_to_symbols() {
        assert_eq!(plain(49), Some(KeyToken::Char('1')));
        assert_eq!(shifted(49), Some(KeyToken::Char('!')));
        assert_eq!(shifted(48), Some(KeyToken::Char(')')));
    }

    #[test]
    fn punctuation_decodes() {
        assert_eq!(plain(186), Some(KeyToken::Char(';')));
        assert_eq!(shifted(186), Some(KeyToken::Char(':')));
        assert_eq!(shifted(222), Some(KeyToken::Char('"')));
        assert_eq!(plain(59), Some(KeyToken::Char(';')));
    }

    #[test]
    fn keypad_ignores_shift() {
        assert_eq!(plain(97), Some(KeyToken::Char('1')));
        assert_eq!(shifted(97), Some(KeyToken::Char('1')));
        assert_eq!(shifted(106), Some(KeyToken::Char('*')));
    }

    #[test]
    fn space_is_printable() {
        assert_eq!(plain(32), Some(KeyToken::Char(' ')));
        assert_eq!(shifted(32), Some(KeyToken::Char(' ')));
    }

    #[test]
    fn control_keys_ignore_shift() {
        assert_eq!(plain(13), Some(KeyToken::Control(ControlKey::Enter)));
        assert_eq!(shifted(9), Some(KeyToken::Control(ControlKey::Tab)));
        assert_eq!(plain(16), Some(KeyToken::Control(ControlKey::Shift)));
        assert!(plain(16).is_some_and(|t| t.is_modifier()));
    }

    #[test]
    fn unknown_code_decodes_to_none() {
        assert_eq!(plain(0), None);
        assert_eq!(plain(255), None);
    }

    #[test]
    fn token_text_form() {
        assert_eq!(KeyToken::Char('a').to_string(), "a");
        assert_eq!(KeyToken::Control(ControlKey::Enter).to_string(), "[Enter]");
        assert_eq!("[".parse::<KeyToken>(), Ok(KeyToken::Char('[')));
        assert_eq!(
            "[Backspace]".parse::<KeyToken>(),
            Ok(KeyToken::Control(ControlKey::Backspace))
        );
        assert!("[Nope]".parse::<KeyToken>().is_err());
        assert!("ab".parse::<KeyToken>().is_err());
        assert!("".parse::<KeyToken>().is_err());
    }

    #[test]
    fn token_serializes_as_string() {
        let json = serde_json::to_string(&KeyToken::Control(ControlKey::Tab)).unwrap();
        assert_eq!(json, "\"[Tab]\"");
        let token: KeyToken = serde_json::from_str("\"q\"").unwrap();
        assert_eq!(token, KeyToken::Char('q'));
    }
}

//! Key code definitions and the US character table
//!
//! Key codes follow the DOM `KeyboardEvent.keyCode` numbering, which is what
//! recorded event logs carry and what terminal input is translated into.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Represents a virtual key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Error returned when a key or token name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized key name: {0:?}")]
pub struct ParseKeyError(pub String);

/// Keys that do not produce a printable character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKey {
    Backspace,
    Tab,
    Enter,
    Shift,
    Control,
    Alt,
    Meta,
    Pause,
    CapsLock,
    Escape,
    PageUp,
    PageDown,
    End,
    Home,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Insert,
    Delete,
    ContextMenu,
    NumLock,
    ScrollLock,
    /// Function key F1-F24
    F(u8),
}

impl ControlKey {
    /// Whether this key only changes the meaning of other keys
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Self::Shift
                | Self::Control
                | Self::Alt
                | Self::Meta
                | Self::CapsLock
                | Self::NumLock
                | Self::ScrollLock
        )
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Backspace => "Backspace",
            Self::Tab => "Tab",
            Self::Enter => "Enter",
            Self::Shift => "Shift",
            Self::Control => "Control",
            Self::Alt => "Alt",
            Self::Meta => "Meta",
            Self::Pause => "Pause",
            Self::CapsLock => "CapsLock",
            Self::Escape => "Escape",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
            Self::End => "End",
            Self::Home => "Home",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowDown => "ArrowDown",
            Self::Insert => "Insert",
            Self::Delete => "Delete",
            Self::ContextMenu => "ContextMenu",
            Self::NumLock => "NumLock",
            Self::ScrollLock => "ScrollLock",
            Self::F(n) => return write!(f, "F{}", n),
        };
        f.write_str(name)
    }
}

impl FromStr for ControlKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "Backspace" => Self::Backspace,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Shift" => Self::Shift,
            "Control" => Self::Control,
            "Alt" => Self::Alt,
            "Meta" => Self::Meta,
            "Pause" => Self::Pause,
            "CapsLock" => Self::CapsLock,
            "Escape" => Self::Escape,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "End" => Self::End,
            "Home" => Self::Home,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowUp" => Self::ArrowUp,
            "ArrowRight" => Self::ArrowRight,
            "ArrowDown" => Self::ArrowDown,
            "Insert" => Self::Insert,
            "Delete" => Self::Delete,
            "ContextMenu" => Self::ContextMenu,
            "NumLock" => Self::NumLock,
            "ScrollLock" => Self::ScrollLock,
            other => {
                let n = other
                    .strip_prefix('F')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=24).contains(n))
                    .ok_or_else(|| ParseKeyError(s.to_string()))?;
                Self::F(n)
            }
        };
        Ok(key)
    }
}

/// How a key contributes to typed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Letter key, stored as its uppercase character
    Letter(char),
    /// Key with an unshifted and a shifted character
    Symbol { base: char, shifted: char },
    /// Numeric keypad key, unaffected by shift
    Keypad(char),
    /// Non-printing key
    Control(ControlKey),
    /// Code missing from the table
    Unknown,
}

/// Information about a key code
#[derive(Debug, Clone, Copy)]
pub struct KeyInfo {
    /// Human readable name
    pub name: &'static str,
    /// What the key types
    pub class: KeyClass,
}

impl KeyInfo {
    const fn new(name: &'static str, class: KeyClass) -> Self {
        Self { name, class }
    }

    const fn letter(name: &'static str, c: char) -> Self {
        Self::new(name, KeyClass::Letter(c))
    }

    const fn symbol(name: &'static str, base: char, shifted: char) -> Self {
        Self::new(name, KeyClass::Symbol { base, shifted })
    }

    const fn keypad(name: &'static str, c: char) -> Self {
        Self::new(name, KeyClass::Keypad(c))
    }

    const fn control(name: &'static str, key: ControlKey) -> Self {
        Self::new(name, KeyClass::Control(key))
    }
}

/// Ordered key table. Canonical codes come before browser-specific aliases so
/// that reverse lookups prefer them.
fn key_table() -> Vec<(KeyCode, KeyInfo)> {
    use ControlKey as C;

    let mut table = vec![
        // Editing and whitespace
        (KeyCode(8), KeyInfo::control("Backspace", C::Backspace)),
        (KeyCode(9), KeyInfo::control("Tab", C::Tab)),
        (KeyCode(13), KeyInfo::control("Enter", C::Enter)),
        (KeyCode(32), KeyInfo::symbol("Space", ' ', ' ')),
        (KeyCode(46), KeyInfo::control("Delete", C::Delete)),
        (KeyCode(45), KeyInfo::control("Insert", C::Insert)),
        // Modifiers and locks
        (KeyCode(16), KeyInfo::control("Shift", C::Shift)),
        (KeyCode(17), KeyInfo::control("Control", C::Control)),
        (KeyCode(18), KeyInfo::control("Alt", C::Alt)),
        (KeyCode(91), KeyInfo::control("LeftMeta", C::Meta)),
        (KeyCode(92), KeyInfo::control("RightMeta", C::Meta)),
        (KeyCode(20), KeyInfo::control("CapsLock", C::CapsLock)),
        (KeyCode(144), KeyInfo::control("NumLock", C::NumLock)),
        (KeyCode(145), KeyInfo::control("ScrollLock", C::ScrollLock)),
        (KeyCode(19), KeyInfo::control("Pause", C::Pause)),
        (KeyCode(27), KeyInfo::control("Escape", C::Escape)),
        (KeyCode(93), KeyInfo::control("ContextMenu", C::ContextMenu)),
        // Navigation cluster
        (KeyCode(33), KeyInfo::control("PageUp", C::PageUp)),
        (KeyCode(34), KeyInfo::control("PageDown", C::PageDown)),
        (KeyCode(35), KeyInfo::control("End", C::End)),
        (KeyCode(36), KeyInfo::control("Home", C::Home)),
        (KeyCode(37), KeyInfo::control("ArrowLeft", C::ArrowLeft)),
        (KeyCode(38), KeyInfo::control("ArrowUp", C::ArrowUp)),
        (KeyCode(39), KeyInfo::control("ArrowRight", C::ArrowRight)),
        (KeyCode(40), KeyInfo::control("ArrowDown", C::ArrowDown)),
        // Number row
        (KeyCode(48), KeyInfo::symbol("0", '0', ')')),
        (KeyCode(49), KeyInfo::symbol("1", '1', '!')),
        (KeyCode(50), KeyInfo::symbol("2", '2', '@')),
        (KeyCode(51), KeyInfo::symbol("3", '3', '#')),
        (KeyCode(52), KeyInfo::symbol("4", '4', '$')),
        (KeyCode(53), KeyInfo::symbol("5", '5', '%')),
        (KeyCode(54), KeyInfo::symbol("6", '6', '^')),
        (KeyCode(55), KeyInfo::symbol("7", '7', '&')),
        (KeyCode(56), KeyInfo::symbol("8", '8', '*')),
        (KeyCode(57), KeyInfo::symbol("9", '9', '(')),
        // Letters
        (KeyCode(65), KeyInfo::letter("A", 'A')),
        (KeyCode(66), KeyInfo::letter("B", 'B')),
        (KeyCode(67), KeyInfo::letter("C", 'C')),
        (KeyCode(68), KeyInfo::letter("D", 'D')),
        (KeyCode(69), KeyInfo::letter("E", 'E')),
        (KeyCode(70), KeyInfo::letter("F", 'F')),
        (KeyCode(71), KeyInfo::letter("G", 'G')),
        (KeyCode(72), KeyInfo::letter("H", 'H')),
        (KeyCode(73), KeyInfo::letter("I", 'I')),
        (KeyCode(74), KeyInfo::letter("J", 'J')),
        (KeyCode(75), KeyInfo::letter("K", 'K')),
        (KeyCode(76), KeyInfo::letter("L", 'L')),
        (KeyCode(77), KeyInfo::letter("M", 'M')),
        (KeyCode(78), KeyInfo::letter("N", 'N')),
        (KeyCode(79), KeyInfo::letter("O", 'O')),
        (KeyCode(80), KeyInfo::letter("P", 'P')),
        (KeyCode(81), KeyInfo::letter("Q", 'Q')),
        (KeyCode(82), KeyInfo::letter("R", 'R')),
        (KeyCode(83), KeyInfo::letter("S", 'S')),
        (KeyCode(84), KeyInfo::letter("T", 'T')),
        (KeyCode(85), KeyInfo::letter("U", 'U')),
        (KeyCode(86), KeyInfo::letter("V", 'V')),
        (KeyCode(87), KeyInfo::letter("W", 'W')),
        (KeyCode(88), KeyInfo::letter("X", 'X')),
        (KeyCode(89), KeyInfo::letter("Y", 'Y')),
        (KeyCode(90), KeyInfo::letter("Z", 'Z')),
        // Punctuation
        (KeyCode(186), KeyInfo::symbol("Semicolon", ';', ':')),
        (KeyCode(187), KeyInfo::symbol("Equals", '=', '+')),
        (KeyCode(188), KeyInfo::symbol("Comma", ',', '<')),
        (KeyCode(189), KeyInfo::symbol("Minus", '-', '_')),
        (KeyCode(190), KeyInfo::symbol("Period", '.', '>')),
        (KeyCode(191), KeyInfo::symbol("Slash", '/', '?')),
        (KeyCode(192), KeyInfo::symbol("Grave", '`', '~')),
        (KeyCode(219), KeyInfo::symbol("LeftBracket", '[', '{')),
        (KeyCode(220), KeyInfo::symbol("Backslash", '\\', '|')),
        (KeyCode(221), KeyInfo::symbol("RightBracket", ']', '}')),
        (KeyCode(222), KeyInfo::symbol("Apostrophe", '\'', '"')),
        // Firefox reports these punctuation keys with different codes
        (KeyCode(59), KeyInfo::symbol("Semicolon", ';', ':')),
        (KeyCode(61), KeyInfo::symbol("Equals", '=', '+')),
        (KeyCode(173), KeyInfo::symbol("Minus", '-', '_')),
        // Numeric keypad
        (KeyCode(96), KeyInfo::keypad("Numpad0", '0')),
        (KeyCode(97), KeyInfo::keypad("Numpad1", '1')),
        (KeyCode(98), KeyInfo::keypad("Numpad2", '2')),
        (KeyCode(99), KeyInfo::keypad("Numpad3", '3')),
        (KeyCode(100), KeyInfo::keypad("Numpad4", '4')),
        (KeyCode(101), KeyInfo::keypad("Numpad5", '5')),
        (KeyCode(102), KeyInfo::keypad("Numpad6", '6')),
        (KeyCode(103), KeyInfo::keypad("Numpad7", '7')),
        (KeyCode(104), KeyInfo::keypad("Numpad8", '8')),
        (KeyCode(105), KeyInfo::keypad("Numpad9", '9')),
        (KeyCode(106), KeyInfo::keypad("NumpadMultiply", '*')),
        (KeyCode(107), KeyInfo::keypad("NumpadAdd", '+')),
        (KeyCode(109), KeyInfo::keypad("NumpadSubtract", '-')),
        (KeyCode(110), KeyInfo::keypad("NumpadDecimal", '.')),
        (KeyCode(111), KeyInfo::keypad("NumpadDivide", '/')),
    ];

    // Function row
    const F_NAMES: [&str; 12] = [
        "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
    ];
    for (i, name) in F_NAMES.iter().enumerate() {
        let n = i as u8 + 1;
        table.push((KeyCode(111 + n as u16), KeyInfo::control(name, C::F(n))));
    }

    table
}

/// Static keymap for the standard US layout
pub static KEYMAP: LazyLock<HashMap<KeyCode, KeyInfo>> =
    LazyLock::new(|| key_table().into_iter().collect());

/// Reverse index: printable character -> (key code, shift required).
/// Keypad keys are left out so that `*` resolves to Shift+8.
static CHAR_INDEX: LazyLock<HashMap<char, (KeyCode, bool)>> = LazyLock::new(|| {
    let mut index = HashMap::new();
    for (code, info) in key_table() {
        match info.class {
            KeyClass::Letter(upper) => {
                index.entry(upper).or_insert((code, true));
                index
                    .entry(upper.to_ascii_lowercase())
                    .or_insert((code, false));
            }
            KeyClass::Symbol { base, shifted } => {
                index.entry(base).or_insert((code, false));
                index.entry(shifted).or_insert((code, true));
            }
            KeyClass::Keypad(_) | KeyClass::Control(_) | KeyClass::Unknown => {}
        }
    }
    index
});

/// Get key info by code, returns a default if not found
pub fn get_key_info(code: KeyCode) -> KeyInfo {
    KEYMAP
        .get(&code)
        .copied()
        .unwrap_or(KeyInfo::new("Unknown", KeyClass::Unknown))
}

/// Look up the key that types `c` and whether Shift must be held for it
pub fn find_by_char(c: char) -> Option<(KeyCode, bool)> {
    CHAR_INDEX.get(&c).copied()
}

//! Keyboard event types and event log loading

use super::{decode, KeyCode, KeyToken};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Type of keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventType {
    /// Key was pressed down
    #[serde(alias = "keydown")]
    Down,
    /// Key was released
    #[serde(alias = "keyup")]
    Up,
}

/// Modifier keys held when an event fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(rename = "shiftKey", default)]
    pub shift: bool,
    #[serde(rename = "ctrlKey", default)]
    pub ctrl: bool,
    #[serde(rename = "altKey", default)]
    pub alt: bool,
    #[serde(rename = "metaKey", default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl, Alt or Meta is held, so the key is a shortcut rather than text
    pub fn is_chord(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A keyboard event with timing information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key code
    #[serde(rename = "keyCode")]
    pub key: KeyCode,
    /// Modifier state at the time of the event
    #[serde(flatten)]
    pub modifiers: Modifiers,
    /// Milliseconds since an arbitrary origin
    pub timestamp: f64,
    /// Type of event (down/up)
    #[serde(rename = "type")]
    pub event_type: KeyEventType,
}

impl KeyEvent {
    pub fn new(
        key: KeyCode,
        event_type: KeyEventType,
        modifiers: Modifiers,
        timestamp: f64,
    ) -> Self {
        Self {
            key,
            modifiers,
            timestamp,
            event_type,
        }
    }

    pub fn down(key: KeyCode, modifiers: Modifiers, timestamp: f64) -> Self {
        Self::new(key, KeyEventType::Down, modifiers, timestamp)
    }

    pub fn up(key: KeyCode, modifiers: Modifiers, timestamp: f64) -> Self {
        Self::new(key, KeyEventType::Up, modifiers, timestamp)
    }

    /// Decode the key and modifier state into a character or control token
    pub fn decode(&self) -> Option<KeyToken> {
        decode(self.key, self.modifiers)
    }
}

/// Error type for reading event logs
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON array of key events
pub fn parse_event_log(json: &str) -> Result<Vec<KeyEvent>, EventLogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of key events from a file
pub fn load_event_log(path: &Path) -> Result<Vec<KeyEvent>, EventLogError> {
    let contents = fs::read_to_string(path)?;
    parse_event_log(&contents)
}

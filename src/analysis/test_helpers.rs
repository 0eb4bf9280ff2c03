//! Shared test utilities for recorder and analysis tests
//!
//! Provides builders for key events and keystroke records.

use crate::keyboard::{KeyCode, KeyEvent, KeyToken, KeystrokeRecord, Modifiers};

/// KeyCode 65 = 'A'
pub const A: KeyCode = KeyCode(65);

/// KeyCode 66 = 'B'
pub const B: KeyCode = KeyCode(66);

/// KeyCode 16 = Shift
pub const SHIFT: KeyCode = KeyCode(16);

/// Creates a key-down event without modifiers.
pub fn down(key: KeyCode, timestamp: f64) -> KeyEvent {
    KeyEvent::down(key, Modifiers::NONE, timestamp)
}

/// Creates a key-down event with Shift held.
pub fn shift_down(key: KeyCode, timestamp: f64) -> KeyEvent {
    KeyEvent::down(key, Modifiers::SHIFT, timestamp)
}

/// Creates a key-up event without modifiers.
pub fn up(key: KeyCode, timestamp: f64) -> KeyEvent {
    KeyEvent::up(key, Modifiers::NONE, timestamp)
}

/// Creates a finished keystroke for a printable character.
pub fn record(c: char, time_down: f64, time_up: f64) -> KeystrokeRecord {
    KeystrokeRecord::new(KeyToken::Char(c), time_down, time_up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyEventType;

    #[test]
    fn down_creates_down_event() {
        let event = down(A, 5.0);
        assert_eq!(event.key, A);
        assert_eq!(event.event_type, KeyEventType::Down);
        assert!(!event.modifiers.shift);
        assert_eq!(event.timestamp, 5.0);
    }

    #[test]
    fn shift_down_sets_shift() {
        let event = shift_down(B, 1.0);
        assert!(event.modifiers.shift);
        assert_eq!(event.decode(), Some(KeyToken::Char('B')));
    }

    #[test]
    fn record_duration() {
        assert_eq!(record('x', 10.0, 35.0).duration_ms(), 25.0);
    }
}

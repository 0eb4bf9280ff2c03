//! Terminal key event translation
//!
//! crossterm reports characters rather than physical keys. Each character is
//! mapped back to the key code that types it, so a press reported as `A` and
//! a release reported as `a` (Shift let go first) land on the same key.

use super::{keymap, KeyCode, KeyEvent, KeyEventType, Modifiers};
use crossterm::event::{
    KeyCode as CtKeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, ModifierKeyCode,
};

/// Flags needed for the terminal to report key releases and bare modifiers
pub fn enhancement_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
}

/// Translate a crossterm key event observed at `timestamp` (ms)
///
/// Returns `None` for keys without a DOM key code equivalent.
pub fn translate(event: &CtKeyEvent, timestamp: f64) -> Option<KeyEvent> {
    let event_type = match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => KeyEventType::Down,
        KeyEventKind::Release => KeyEventType::Up,
    };

    let mut modifiers = Modifiers {
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        meta: event.modifiers.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    };

    let code = match event.code {
        CtKeyCode::Char(c) => {
            let (code, needs_shift) = keymap::find_by_char(c)?;
            // Legacy terminals send the shifted character without the SHIFT bit
            modifiers.shift |= needs_shift;
            code.as_u16()
        }
        CtKeyCode::BackTab => {
            modifiers.shift = true;
            9
        }
        CtKeyCode::Backspace => 8,
        CtKeyCode::Tab => 9,
        CtKeyCode::Enter => 13,
        CtKeyCode::Pause => 19,
        CtKeyCode::CapsLock => 20,
        CtKeyCode::Esc => 27,
        CtKeyCode::PageUp => 33,
        CtKeyCode::PageDown => 34,
        CtKeyCode::End => 35,
        CtKeyCode::Home => 36,
        CtKeyCode::Left => 37,
        CtKeyCode::Up => 38,
        CtKeyCode::Right => 39,
        CtKeyCode::Down => 40,
        CtKeyCode::Insert => 45,
        CtKeyCode::Delete => 46,
        CtKeyCode::Menu => 93,
        CtKeyCode::NumLock => 144,
        CtKeyCode::ScrollLock => 145,
        CtKeyCode::F(n @ 1..=12) => 111 + n as u16,
        CtKeyCode::Modifier(modifier) => modifier_code(modifier)?,
        _ => return None,
    };

    Some(KeyEvent::new(KeyCode(code), event_type, modifiers, timestamp))
}

fn modifier_code(modifier: ModifierKeyCode) -> Option<u16> {
    let code = match modifier {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => 16,
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => 17,
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => 18,
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => 91,
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => 92,
        _ => return None,
    };
    Some(code)
}

//! Keyboard events, decoding and session recording

mod decode;
mod event;
pub mod keymap;
mod recorder;
pub mod terminal;

pub use decode::{decode, KeyToken};
pub use event::{
    load_event_log, parse_event_log, EventLogError, KeyEvent, KeyEventType, Modifiers,
};
pub use keymap::{get_key_info, ControlKey, KeyClass, KeyCode, KeyInfo, KEYMAP};
pub use recorder::{KeystrokeRecord, RecorderStats, Session, SessionRecorder};

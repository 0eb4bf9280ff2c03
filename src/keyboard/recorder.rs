//! Session recording: pairing key-down and key-up events into keystrokes

use super::{KeyCode, KeyEvent, KeyEventType, KeyToken};
use crate::config::RecorderConfig;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A completed keystroke. Never modified after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeRecord {
    /// Character (or control token) decoded at key-down time
    pub character: KeyToken,
    /// Timestamp of the key-down event in ms
    pub time_down: f64,
    /// Timestamp of the key-up event in ms
    pub time_up: f64,
}

impl KeystrokeRecord {
    pub fn new(character: KeyToken, time_down: f64, time_up: f64) -> Self {
        Self {
            character,
            time_down,
            time_up,
        }
    }

    /// How long the key was held, in ms
    pub fn duration_ms(&self) -> f64 {
        self.time_up - self.time_down
    }
}

/// A finished recording, in the shape it is exported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Name of the person typing
    #[serde(default)]
    pub user: Option<String>,
    /// Keystrokes in completion order
    pub data: Vec<KeystrokeRecord>,
}

impl Session {
    pub fn new(user: Option<String>, data: Vec<KeystrokeRecord>) -> Self {
        Self { user, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Counters describing how the recorder treated its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderStats {
    /// Events seen
    pub events: u64,
    /// Keystrokes completed
    pub recorded: u64,
    /// Key-downs that do not produce a recordable token
    pub ignored: u64,
    /// Extra key-downs for a key that was already down (auto-repeat)
    pub repeats: u64,
    /// Key-ups without a pending key-down
    pub unmatched_ups: u64,
    /// Key-ups timestamped before their key-down
    pub out_of_order: u64,
    /// Key-downs whose key-up never arrived
    pub dropped_downs: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingKey {
    token: KeyToken,
    time_down: f64,
}

/// Pairs down/up events into [`KeystrokeRecord`]s.
///
/// Pending key-downs are keyed by physical key code, not by character. The
/// character is fixed when the key goes down, so releasing Shift before the
/// letter key (down reads `A`, up reads `a`) still completes an `A`.
pub struct SessionRecorder {
    /// Completed keystrokes in completion order
    records: Vec<KeystrokeRecord>,
    /// Key-downs waiting for their key-up
    pending: HashMap<KeyCode, PendingKey>,
    /// Keys whose key-down was ignored; their key-up is ignored too
    suppressed: HashSet<KeyCode>,
    /// Pending downs older than this are treated as lost (0 disables)
    max_hold_ms: f64,
    /// Record Enter, Backspace, arrows etc. as control tokens
    record_control_keys: bool,
    stats: RecorderStats,
}

impl SessionRecorder {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            records: Vec::new(),
            pending: HashMap::new(),
            suppressed: HashSet::new(),
            max_hold_ms: config.max_hold_ms as f64,
            record_control_keys: config.record_control_keys,
            stats: RecorderStats::default(),
        }
    }

    /// Process a key event. Returns the keystroke it completed, if any.
    pub fn process_event(&mut self, event: &KeyEvent) -> Option<&KeystrokeRecord> {
        self.stats.events += 1;
        self.evict_stale(event.timestamp);

        match event.event_type {
            KeyEventType::Down => {
                self.key_down(event);
                None
            }
            KeyEventType::Up => self.key_up(event),
        }
    }

    fn key_down(&mut self, event: &KeyEvent) {
        let Some(token) = self.recordable_token(event) else {
            debug!("ignoring key-down for key {}", event.key.as_u16());
            self.stats.ignored += 1;
            // A pending key keeps its own key-up
            if !self.pending.contains_key(&event.key) {
                self.suppressed.insert(event.key);
            }
            return;
        };

        if let Some(pending) = self.pending.get(&event.key) {
            debug!(
                "repeat key-down for {} at {:.1}ms, keeping first at {:.1}ms",
                pending.token, event.timestamp, pending.time_down
            );
            self.stats.repeats += 1;
            return;
        }

        self.suppressed.remove(&event.key);
        self.pending.insert(
            event.key,
            PendingKey {
                token,
                time_down: event.timestamp,
            },
        );
    }

    fn key_up(&mut self, event: &KeyEvent) -> Option<&KeystrokeRecord> {
        let Some(pending) = self.pending.remove(&event.key) else {
            if !self.suppressed.remove(&event.key) {
                debug!("key-up for key {} without key-down", event.key.as_u16());
                self.stats.unmatched_ups += 1;
            }
            return None;
        };

        if event.timestamp < pending.time_down {
            debug!(
                "discarding {}: key-up at {:.1}ms precedes key-down at {:.1}ms",
                pending.token, event.timestamp, pending.time_down
            );
            self.stats.out_of_order += 1;
            return None;
        }

        self.records.push(KeystrokeRecord::new(
            pending.token,
            pending.time_down,
            event.timestamp,
        ));
        self.stats.recorded += 1;
        self.records.last()
    }

    /// Token to record for a key-down, or `None` if it types nothing
    fn recordable_token(&self, event: &KeyEvent) -> Option<KeyToken> {
        if event.modifiers.is_chord() {
            return None;
        }
        match event.decode()? {
            token @ KeyToken::Char(_) => Some(token),
            KeyToken::Control(key) if key.is_modifier() => None,
            token @ KeyToken::Control(_) if self.record_control_keys => Some(token),
            KeyToken::Control(_) => None,
        }
    }

    /// Drop pending downs that have been held longer than `max_hold_ms`
    fn evict_stale(&mut self, now: f64) {
        if self.max_hold_ms <= 0.0 {
            return;
        }
        let max_hold_ms = self.max_hold_ms;
        let before = self.pending.len();
        self.pending.retain(|key, pending| {
            let keep = now - pending.time_down <= max_hold_ms;
            if !keep {
                debug!(
                    "dropping {} (key {}): no key-up within {}ms",
                    pending.token,
                    key.as_u16(),
                    max_hold_ms
                );
            }
            keep
        });
        self.stats.dropped_downs += (before - self.pending.len()) as u64;
    }

    /// Completed keystrokes in completion order
    pub fn records(&self) -> &[KeystrokeRecord] {
        &self.records
    }

    /// Number of key-downs still waiting for a key-up
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a key-down for `key` is waiting for its key-up
    pub fn is_pending(&self, key: KeyCode) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    /// Snapshot of the session so far
    pub fn session(&self, user: Option<String>) -> Session {
        Session::new(user, self.records.clone())
    }

    /// End the recording and hand over its keystrokes.
    ///
    /// Key-downs still pending are counted as dropped. Stats stay readable
    /// afterwards; the recorder starts over empty.
    pub fn finish(&mut self, user: Option<String>) -> Session {
        if !self.pending.is_empty() {
            debug!("{} key-down(s) pending at end of session", self.pending.len());
        }
        self.stats.dropped_downs += self.pending.len() as u64;
        self.pending.clear();
        self.suppressed.clear();
        Session::new(user, std::mem::take(&mut self.records))
    }

    /// Discard all recorded keystrokes and pending state
    pub fn clear(&mut self) {
        self.records.clear();
        self.pending.clear();
        self.suppressed.clear();
        self.stats = RecorderStats::default();
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(&RecorderConfig::default())
    }
}

//! Keystrokes ordered by key-down time

use super::{Analysis, AnalysisResult};
use crate::keyboard::KeystrokeRecord;
use crate::utils::format_ms;

/// Sort records by key-down time. The sort is stable, so keystrokes that went
/// down at the same instant keep their completion order.
pub fn sort_by_down_time(records: &[KeystrokeRecord]) -> Vec<KeystrokeRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.time_down.total_cmp(&b.time_down));
    sorted
}

/// The sorted view of a session
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    records: Vec<KeystrokeRecord>,
}

impl Timeline {
    /// Records sorted by key-down time
    pub fn records(&self) -> &[KeystrokeRecord] {
        &self.records
    }

    /// Time from the first key-down to the last key-up
    pub fn span_ms(&self) -> Option<f64> {
        let first = self.records.first()?.time_down;
        let last = self
            .records
            .iter()
            .map(|r| r.time_up)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(last - first)
    }

    /// The recorded characters in key-down order
    pub fn text(&self) -> String {
        self.records
            .iter()
            .filter_map(|r| r.character.as_char())
            .collect()
    }
}

impl Analysis for Timeline {
    fn name(&self) -> &'static str {
        "Timeline"
    }

    fn description(&self) -> &'static str {
        "Keystrokes in the order their keys went down"
    }

    fn analyze(&mut self, timeline: &[KeystrokeRecord]) {
        self.records = timeline.to_vec();
    }

    fn get_results(&self) -> Vec<AnalysisResult> {
        let mut results = vec![AnalysisResult::info(
            "Keystrokes",
            format!("{}", self.records.len()),
        )];

        if let Some(span) = self.span_ms() {
            results.push(AnalysisResult::info("Session Span", format_ms(span)));
        }

        results
    }

    fn reset(&mut self) {
        self.records.clear();
    }
}

//! Key hold duration statistics

use super::{Analysis, AnalysisResult, ResultStatus};
use crate::keyboard::{KeyToken, KeystrokeRecord};
use crate::utils::{format_ms, TimingAccumulator};
use std::collections::BTreeMap;

/// Holds shorter than this are likely switch chatter rather than typing
const SUSPICIOUS_HOLD_MS: f64 = 5.0;

/// Hold times overall and per character
#[derive(Debug, Clone, Default)]
pub struct HoldAnalysis {
    /// Every keystroke
    overall: TimingAccumulator,
    /// Keystrokes grouped by character
    per_key: BTreeMap<KeyToken, TimingAccumulator>,
}

impl HoldAnalysis {
    /// Average time keys were held down, `None` for an empty session
    pub fn average_hold_ms(&self) -> Option<f64> {
        self.overall.mean_ms()
    }

    pub fn overall(&self) -> &TimingAccumulator {
        &self.overall
    }

    /// Hold statistics for one character
    pub fn key(&self, token: impl Into<KeyToken>) -> Option<&TimingAccumulator> {
        self.per_key.get(&token.into())
    }

    /// Per-character statistics in token order
    pub fn keys(&self) -> impl Iterator<Item = (&KeyToken, &TimingAccumulator)> {
        self.per_key.iter()
    }

    /// Character with the longest average hold
    pub fn longest_held(&self) -> Option<(KeyToken, f64)> {
        self.averages().max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Character with the shortest average hold
    pub fn shortest_held(&self) -> Option<(KeyToken, f64)> {
        self.averages().min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn averages(&self) -> impl Iterator<Item = (KeyToken, f64)> + '_ {
        self.per_key
            .iter()
            .filter_map(|(token, stats)| stats.mean_ms().map(|avg| (*token, avg)))
    }
}

impl Analysis for HoldAnalysis {
    fn name(&self) -> &'static str {
        "Hold Time"
    }

    fn description(&self) -> &'static str {
        "How long each key is held down"
    }

    fn analyze(&mut self, timeline: &[KeystrokeRecord]) {
        self.reset();
        for record in timeline {
            let duration = record.duration_ms();
            self.overall.add(duration);
            self.per_key.entry(record.character).or_default().add(duration);
        }
    }

    fn get_results(&self) -> Vec<AnalysisResult> {
        let mut results = Vec::new();

        match self.average_hold_ms() {
            Some(avg) => results.push(AnalysisResult::info("Avg Hold", format_ms(avg))),
            None => results.push(AnalysisResult::info("Avg Hold", "No keystrokes")),
        }

        if let Some(min) = self.overall.min_ms {
            let status = if min < SUSPICIOUS_HOLD_MS {
                ResultStatus::Warning
            } else {
                ResultStatus::Info
            };
            results.push(AnalysisResult::new("Min Hold", format_ms(min), status));
        }
        if let Some(max) = self.overall.max_ms {
            results.push(AnalysisResult::info("Max Hold", format_ms(max)));
        }

        results.push(AnalysisResult::info(
            "Distinct Keys",
            format!("{}", self.per_key.len()),
        ));

        if let Some((token, avg)) = self.shortest_held() {
            results.push(AnalysisResult::ok(
                "Shortest Hold",
                format!("{}: {}", token, format_ms(avg)),
            ));
        }
        if let Some((token, avg)) = self.longest_held() {
            results.push(AnalysisResult::warning(
                "Longest Hold",
                format!("{}: {}", token, format_ms(avg)),
            ));
        }

        results
    }

    fn reset(&mut self) {
        self.overall = TimingAccumulator::default();
        self.per_key.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_helpers::record;

    fn analyzed(records: &[KeystrokeRecord]) -> HoldAnalysis {
        let mut holds = HoldAnalysis::default();
        holds.analyze(records);
        holds
    }

    #[test]
    fn average_over_all_keystrokes() {
        let holds = analyzed(&[
            record('a', 0.0, 100.0),
            record('b', 10.0, 60.0),
            record('a', 200.0, 260.0),
        ]);
        assert_eq!(holds.average_hold_ms(), Some(70.0));
        assert_eq!(holds.overall().count, 3);
    }

    #[test]
    fn empty_session_has_no_average() {
        let holds = analyzed(&[]);
        assert_eq!(holds.average_hold_ms(), None);
        assert_eq!(holds.longest_held(), None);
        let results = holds.get_results();
        assert_eq!(results[0].value, "No keystrokes");
    }

    #[test]
    fn per_key_breakdown() {
        let holds = analyzed(&[
            record('a', 0.0, 100.0),
            record('a', 200.0, 260.0),
            record('b', 10.0, 60.0),
        ]);
        let a = holds.key('a').expect("a recorded");
        assert_eq!(a.count, 2);
        assert_eq!(a.mean_ms(), Some(80.0));
        assert_eq!(a.min_ms, Some(60.0));
        assert_eq!(a.max_ms, Some(100.0));
        assert!(holds.key('z').is_none());
        assert_eq!(holds.keys().count(), 2);
    }

    #[test]
    fn longest_and_shortest() {
        let holds = analyzed(&[record('a', 0.0, 100.0), record('b', 10.0, 60.0)]);
        assert_eq!(holds.longest_held(), Some((KeyToken::Char('a'), 100.0)));
        assert_eq!(holds.shortest_held(), Some((KeyToken::Char('b'), 50.0)));
    }

    #[test]
    fn very_short_hold_is_flagged() {
        let holds = analyzed(&[record('a', 0.0, 2.0)]);
        let min = holds
            .get_results()
            .into_iter()
            .find(|r| r.label == "Min Hold")
            .expect("min hold result");
        assert_eq!(min.status, ResultStatus::Warning);
    }

    #[test]
    fn analyze_replaces_previous_values() {
        let mut holds = analyzed(&[record('a', 0.0, 100.0)]);
        holds.analyze(&[record('b', 0.0, 20.0)]);
        assert_eq!(holds.average_hold_ms(), Some(20.0));
        assert!(holds.key('a').is_none());
    }
}

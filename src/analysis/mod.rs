//! Statistics over recorded keystrokes

pub mod hold;
pub mod latency;
pub mod timeline;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use hold::HoldAnalysis;
pub use latency::{DigraphLatency, LatencyMatrix};
pub use timeline::{sort_by_down_time, Timeline};

use crate::keyboard::KeystrokeRecord;

/// Common trait for all keystroke analyses
pub trait Analysis {
    /// Name of the analysis
    fn name(&self) -> &'static str;

    /// Short description
    fn description(&self) -> &'static str;

    /// Recompute from records sorted by key-down time
    fn analyze(&mut self, timeline: &[KeystrokeRecord]);

    /// Get results as formatted strings
    fn get_results(&self) -> Vec<AnalysisResult>;

    /// Forget all computed values
    fn reset(&mut self);
}

/// A single result entry
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl AnalysisResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Error)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}

/// All statistics for one set of keystrokes, computed once
#[derive(Debug, Clone, Default)]
pub struct SessionAnalysis {
    /// Records sorted by key-down time
    pub timeline: Timeline,
    /// Hold durations
    pub holds: HoldAnalysis,
    /// Average latency between consecutive keys
    pub latency: LatencyMatrix,
}

impl SessionAnalysis {
    pub fn new(records: &[KeystrokeRecord]) -> Self {
        let mut analysis = Self::default();
        analysis.update(records);
        analysis
    }

    /// Recompute everything from `records` (any order)
    pub fn update(&mut self, records: &[KeystrokeRecord]) {
        let sorted = sort_by_down_time(records);
        self.timeline.analyze(&sorted);
        self.holds.analyze(&sorted);
        self.latency.analyze(&sorted);
    }

    /// Average hold duration over every keystroke
    pub fn average_hold_ms(&self) -> Option<f64> {
        self.holds.average_hold_ms()
    }

    pub fn analyses(&self) -> [&dyn Analysis; 3] {
        [&self.timeline, &self.holds, &self.latency]
    }

    /// Results of every analysis, in display order
    pub fn results(&self) -> Vec<AnalysisResult> {
        self.analyses()
            .iter()
            .flat_map(|analysis| analysis.get_results())
            .collect()
    }

    pub fn reset(&mut self) {
        self.timeline.reset();
        self.holds.reset();
        self.latency.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::record;
    use super::*;

    #[test]
    fn session_analysis_sorts_before_analyzing() {
        // Completion order differs from key-down order
        let records = [
            record('b', 30.0, 90.0),
            record('a', 0.0, 100.0),
            record('c', 60.0, 80.0),
        ];
        let analysis = SessionAnalysis::new(&records);

        let order: Vec<char> = analysis
            .timeline
            .records()
            .iter()
            .filter_map(|r| r.character.as_char())
            .collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert_eq!(analysis.average_hold_ms(), Some(60.0));
        assert_eq!(analysis.latency.average_ms('a', 'b'), Some(30.0));
        assert_eq!(analysis.latency.average_ms('b', 'c'), Some(30.0));
    }

    #[test]
    fn empty_session_has_no_averages() {
        let analysis = SessionAnalysis::new(&[]);
        assert_eq!(analysis.average_hold_ms(), None);
        assert!(analysis.latency.is_empty());
        assert!(!analysis.results().is_empty());
    }

    #[test]
    fn reset_clears_all() {
        let mut analysis =
            SessionAnalysis::new(&[record('a', 0.0, 50.0), record('b', 10.0, 70.0)]);
        analysis.reset();
        assert_eq!(analysis.average_hold_ms(), None);
        assert!(analysis.latency.is_empty());
        assert!(analysis.timeline.records().is_empty());
    }

    #[test]
    fn analyses_have_names() {
        let analysis = SessionAnalysis::default();
        let names: Vec<&str> = analysis.analyses().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Timeline", "Hold Time", "Key Pair Latency"]);
        assert!(analysis.analyses().iter().all(|a| !a.description().is_empty()));
    }
}

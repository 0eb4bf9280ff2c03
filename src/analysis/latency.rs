//! Key pair latency matrix
//!
//! For every pair of keystrokes that follow each other in key-down order, the
//! time between the two key-downs is added to the cell for that character
//! pair. A cell's value is the mean over all occurrences of the pair, so if
//! `at` is typed several times the `(a, t)` cell holds the average time from
//! pressing `a` to pressing `t`.

use super::{Analysis, AnalysisResult};
use crate::keyboard::{KeyToken, KeystrokeRecord};
use crate::utils::{format_ms, TimingAccumulator};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Average latency of one character pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigraphLatency {
    pub from: KeyToken,
    pub to: KeyToken,
    pub average_ms: f64,
    pub count: u64,
}

/// Sparse matrix of average key-down to key-down latencies
#[derive(Debug, Clone, Default)]
pub struct LatencyMatrix {
    cells: BTreeMap<(KeyToken, KeyToken), TimingAccumulator>,
}

impl LatencyMatrix {
    /// Build from records already sorted by key-down time
    pub fn from_timeline(timeline: &[KeystrokeRecord]) -> Self {
        let mut matrix = Self::default();
        matrix.analyze(timeline);
        matrix
    }

    /// Average latency from `from` to `to`, if the pair occurred
    pub fn average_ms(&self, from: impl Into<KeyToken>, to: impl Into<KeyToken>) -> Option<f64> {
        self.cells.get(&(from.into(), to.into()))?.mean_ms()
    }

    /// Number of times the pair occurred
    pub fn count(&self, from: impl Into<KeyToken>, to: impl Into<KeyToken>) -> u64 {
        self.cells
            .get(&(from.into(), to.into()))
            .map_or(0, |cell| cell.count)
    }

    /// Filled cells in (row, column) order
    pub fn cells(&self) -> impl Iterator<Item = DigraphLatency> + '_ {
        self.cells.iter().filter_map(|(&(from, to), cell)| {
            cell.mean_ms().map(|average_ms| DigraphLatency {
                from,
                to,
                average_ms,
                count: cell.count,
            })
        })
    }

    /// Characters that start at least one pair
    pub fn rows(&self) -> Vec<KeyToken> {
        self.cells
            .keys()
            .map(|(from, _)| *from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Characters that end at least one pair
    pub fn columns(&self) -> Vec<KeyToken> {
        self.cells
            .keys()
            .map(|(_, to)| *to)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct pairs
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pair with the lowest average latency
    pub fn fastest(&self) -> Option<DigraphLatency> {
        self.cells().min_by(|a, b| a.average_ms.total_cmp(&b.average_ms))
    }

    /// Pair with the highest average latency
    pub fn slowest(&self) -> Option<DigraphLatency> {
        self.cells().max_by(|a, b| a.average_ms.total_cmp(&b.average_ms))
    }

    /// Mean latency over every consecutive pair
    pub fn overall_average_ms(&self) -> Option<f64> {
        let (total, count) = self
            .cells
            .values()
            .fold((0.0, 0u64), |(t, c), cell| (t + cell.total_ms, c + cell.count));
        (count > 0).then(|| total / count as f64)
    }
}

impl Analysis for LatencyMatrix {
    fn name(&self) -> &'static str {
        "Key Pair Latency"
    }

    fn description(&self) -> &'static str {
        "Average time between consecutive key-downs per character pair"
    }

    fn analyze(&mut self, timeline: &[KeystrokeRecord]) {
        self.reset();
        for pair in timeline.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            self.cells
                .entry((current.character, next.character))
                .or_default()
                .add(next.time_down - current.time_down);
        }
    }

    fn get_results(&self) -> Vec<AnalysisResult> {
        let mut results = vec![AnalysisResult::info(
            "Key Pairs",
            format!("{}", self.len()),
        )];

        if let Some(avg) = self.overall_average_ms() {
            results.push(AnalysisResult::info("Avg Latency", format_ms(avg)));
        }

        if let Some(fastest) = self.fastest() {
            results.push(AnalysisResult::ok(
                "Fastest Pair",
                format!("{}{}: {}", fastest.from, fastest.to, format_ms(fastest.average_ms)),
            ));
        }
        if let Some(slowest) = self.slowest() {
            results.push(AnalysisResult::warning(
                "Slowest Pair",
                format!("{}{}: {}", slowest.from, slowest.to, format_ms(slowest.average_ms)),
            ));
        }

        results
    }

    fn reset(&mut self) {
        self.cells.clear();
    }
}

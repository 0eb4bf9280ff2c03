//! Shared utility types

use serde::{Deserialize, Serialize};

/// Running count, sum, minimum and maximum of millisecond samples.
///
/// # Example
///
/// ```
/// use typespy::utils::TimingAccumulator;
///
/// let mut hold = TimingAccumulator::default();
/// assert_eq!(hold.mean_ms(), None);
///
/// hold.add(80.0);
/// hold.add(120.0);
/// assert_eq!(hold.count, 2);
/// assert_eq!(hold.mean_ms(), Some(100.0));
/// assert_eq!(hold.min_ms, Some(80.0));
/// assert_eq!(hold.max_ms, Some(120.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingAccumulator {
    /// Number of samples
    pub count: u64,
    /// Sum of all samples
    pub total_ms: f64,
    /// Smallest sample seen
    pub min_ms: Option<f64>,
    /// Largest sample seen
    pub max_ms: Option<f64>,
}

impl TimingAccumulator {
    /// Add one sample
    pub fn add(&mut self, sample_ms: f64) {
        self.count += 1;
        self.total_ms += sample_ms;
        self.min_ms = Some(self.min_ms.map_or(sample_ms, |m| m.min(sample_ms)));
        self.max_ms = Some(self.max_ms.map_or(sample_ms, |m| m.max(sample_ms)));
    }

    /// Arithmetic mean, or `None` without samples
    pub fn mean_ms(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.total_ms / self.count as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Format a millisecond value for display
pub fn format_ms(ms: f64) -> String {
    format!("{:.1} ms", ms)
}

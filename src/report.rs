//! Session and report export

use crate::analysis::{DigraphLatency, SessionAnalysis};
use crate::keyboard::{KeyToken, KeystrokeRecord, RecorderStats, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

/// Error type for reading and writing exports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

impl Session {
    /// Serialize as `{"user": ..., "data": [...]}`
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        to_json_string(self, pretty)
    }

    /// Export session to JSON file
    pub fn export_json(&self, path: &Path, pretty: bool) -> Result<(), ReportError> {
        write_file(path, &self.to_json(pretty)?)
    }

    /// Parse a session previously exported with [`Session::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a session from a JSON file
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }
}

/// Complete statistics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Name of the person typing
    pub user: Option<String>,
    /// Summary statistics
    pub summary: ReportSummary,
    /// Per-character hold statistics
    pub holds: Vec<KeyHoldEntry>,
    /// Average latency per character pair
    pub latency: Vec<DigraphLatency>,
    /// Keystrokes sorted by key-down time
    pub data: Vec<KeystrokeRecord>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Number of keystrokes
    pub record_count: usize,
}

/// Session summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Average time keys were held down
    pub average_hold_ms: Option<f64>,
    /// Average time between consecutive key-downs
    pub average_latency_ms: Option<f64>,
    /// Time from first key-down to last key-up
    pub span_ms: Option<f64>,
    /// How the recorder treated raw events, when the session was recorded
    /// rather than loaded
    pub recorder: Option<RecorderStats>,
}

/// Hold statistics for one character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyHoldEntry {
    pub character: KeyToken,
    pub count: u64,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl SessionReport {
    /// Create a new report
    pub fn new(
        session: &Session,
        analysis: &SessionAnalysis,
        recorder: Option<RecorderStats>,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();

        let holds = analysis
            .holds
            .keys()
            .filter_map(|(token, stats)| {
                Some(KeyHoldEntry {
                    character: *token,
                    count: stats.count,
                    average_ms: stats.mean_ms()?,
                    min_ms: stats.min_ms?,
                    max_ms: stats.max_ms?,
                })
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                record_count: session.len(),
            },
            user: session.user.clone(),
            summary: ReportSummary {
                average_hold_ms: analysis.average_hold_ms(),
                average_latency_ms: analysis.latency.overall_average_ms(),
                span_ms: analysis.timeline.span_ms(),
                recorder,
            },
            holds,
            latency: analysis.latency.cells().collect(),
            data: analysis.timeline.records().to_vec(),
        }
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path, pretty: bool) -> Result<(), ReportError> {
        write_file(path, &self.to_json(pretty)?)
    }

    /// Export report to JSON string
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        to_json_string(self, pretty)
    }
}

//! Analyzer framework.
//!
//! Every analyzer is an independent, pure function over the shared
//! [`Artifacts`] bundle, declaring up front which inputs it needs. The
//! registry filters analyzers whose inputs are unavailable and runs the
//! rest concurrently under per-analyzer timeouts; results carry an
//! explicit status instead of sentinel scores.

pub mod content;
pub mod disfluency;
pub mod effectiveness;
pub mod pronunciation;
pub mod prosody;
pub mod registry;
pub mod structure;
pub mod timing;

pub use registry::AnalyzerRegistry;

use crate::Result;
use crate::core::evaluation::Artifacts;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conservative default score reported by degraded, failed, and skipped
/// analyzers.
pub const DEFAULT_SCORE: f64 = 50.0;

/// Inputs an analyzer may require from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// The annotated transcript.
    Transcript,
    /// The decoded audio buffer.
    Audio,
    /// The pitch contour.
    Pitch,
    /// The intensity contour.
    Intensity,
    /// The MFCC matrix.
    Mfcc,
    /// Onset strength and picked onsets.
    Onsets,
    /// A request topic.
    Topic,
    /// An expected-duration string.
    ExpectedDuration,
}

/// Outcome classification of one analyzer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerStatus {
    /// Full computation succeeded.
    Ok,
    /// Partial computation; the score is a conservative default or was
    /// derived from fallback inputs.
    Degraded,
    /// The analyzer crashed or exceeded its budget.
    Failed,
    /// Required input was missing; the analyzer never ran.
    Skipped,
}

impl AnalyzerStatus {
    /// Whether the result should contribute weight in aggregation.
    /// Degraded results still contribute; skipped and failed ones are
    /// redistributed.
    pub fn contributes(&self) -> bool {
        matches!(self, AnalyzerStatus::Ok | AnalyzerStatus::Degraded)
    }
}

/// A single metric value attached to an analyzer result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::Number(value as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

impl From<Vec<String>> for MetricValue {
    fn from(value: Vec<String>) -> Self {
        MetricValue::List(value)
    }
}

/// Uniform result shape every analyzer produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerResult {
    /// Stable analyzer identifier.
    pub analyzer_id: String,
    /// Normalized score in [0, 100].
    pub score: f64,
    /// Quantitative and categorical metrics, ordered by key for
    /// deterministic serialization.
    pub metrics: BTreeMap<String, MetricValue>,
    /// Human-readable findings, most important first.
    pub feedback: Vec<String>,
    /// Outcome classification.
    pub status: AnalyzerStatus,
    /// Diagnostic message for degraded and failed results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzerResult {
    /// Successful result with the given score (clamped to [0, 100]).
    pub fn ok(analyzer_id: &str, score: f64) -> Self {
        Self {
            analyzer_id: analyzer_id.to_string(),
            score: score.clamp(0.0, 100.0),
            metrics: BTreeMap::new(),
            feedback: Vec::new(),
            status: AnalyzerStatus::Ok,
            error: None,
        }
    }

    /// Degraded result with a conservative score and explanation.
    pub fn degraded(analyzer_id: &str, score: f64, reason: &str) -> Self {
        Self {
            analyzer_id: analyzer_id.to_string(),
            score: score.clamp(0.0, 100.0),
            metrics: BTreeMap::new(),
            feedback: Vec::new(),
            status: AnalyzerStatus::Degraded,
            error: Some(reason.to_string()),
        }
    }

    /// Failed result carrying the default score and the failure message.
    pub fn failed(analyzer_id: &str, reason: &str) -> Self {
        Self {
            analyzer_id: analyzer_id.to_string(),
            score: DEFAULT_SCORE,
            metrics: BTreeMap::new(),
            feedback: Vec::new(),
            status: AnalyzerStatus::Failed,
            error: Some(reason.to_string()),
        }
    }

    /// Skipped result for a missing required input.
    pub fn skipped(analyzer_id: &str, reason: &str) -> Self {
        Self {
            analyzer_id: analyzer_id.to_string(),
            score: DEFAULT_SCORE,
            metrics: BTreeMap::new(),
            feedback: Vec::new(),
            status: AnalyzerStatus::Skipped,
            error: Some(reason.to_string()),
        }
    }

    /// Attach one metric.
    pub fn with_metric<V: Into<MetricValue>>(mut self, key: &str, value: V) -> Self {
        self.metrics.insert(key.to_string(), value.into());
        self
    }

    /// Append one feedback line.
    pub fn with_feedback<S: Into<String>>(mut self, line: S) -> Self {
        self.feedback.push(line.into());
        self
    }

    /// Append several feedback lines.
    pub fn with_feedback_lines(mut self, lines: Vec<String>) -> Self {
        self.feedback.extend(lines);
        self
    }
}

/// Contract every analyzer implements.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Stable identifier; also the key in the aggregation weight map.
    fn id(&self) -> &'static str;

    /// Inputs this analyzer cannot run without. The registry marks the
    /// analyzer `skipped` when one is unavailable.
    fn required_features(&self) -> &'static [Feature];

    /// Run the analysis over the shared artifacts.
    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult>;
}

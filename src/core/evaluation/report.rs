//! The response envelope returned for every successful evaluation.

use crate::core::analyzers::AnalyzerResult;
use crate::core::transcript::AnnotatedTranscript;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transcript section of the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSummary {
    /// Plain transcript text.
    pub text: String,
    /// Transcript with `[d.d second pause]` markers.
    pub annotated: String,
    /// Number of annotated pauses.
    pub pause_count: usize,
    /// Speaking rate in words per second.
    pub speaking_rate: f64,
}

impl From<&AnnotatedTranscript> for TranscriptSummary {
    fn from(transcript: &AnnotatedTranscript) -> Self {
        Self {
            text: transcript.plain_text(),
            annotated: transcript.annotated_text(),
            pause_count: transcript.pause_count,
            speaking_rate: (transcript.speaking_rate * 100.0).round() / 100.0,
        }
    }
}

/// Complete evaluation result for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Weighted final score in [0, 100].
    pub final_score: i64,
    /// Qualitative rating label for the final score.
    pub rating: String,
    /// Integer sub-score per analyzer id.
    pub component_scores: BTreeMap<String, i64>,
    /// Full per-analyzer results including status and metrics.
    pub analyzers: Vec<AnalyzerResult>,
    /// Prioritized improvement suggestions, at most five.
    pub suggestions: Vec<String>,
    /// Transcript summary.
    pub transcript: TranscriptSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzers::AnalyzerResult;
    use crate::core::transcript::{TranscriptBuilder, TranscriptionResult};

    #[test]
    fn test_report_serializes_with_expected_fields() {
        let transcript = TranscriptBuilder::new().build(&TranscriptionResult::default(), 10.0);
        let report = EvaluationReport {
            final_score: 82,
            rating: "Excellent".to_string(),
            component_scores: BTreeMap::from([("timing".to_string(), 90)]),
            analyzers: vec![AnalyzerResult::ok("timing", 90.0)],
            suggestions: vec!["Keep it up.".to_string()],
            transcript: TranscriptSummary::from(&transcript),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["final_score"], 82);
        assert_eq!(json["rating"], "Excellent");
        assert_eq!(json["component_scores"]["timing"], 90);
        assert!(json["transcript"]["annotated"].is_string());
        assert_eq!(json["analyzers"][0]["status"], "ok");
    }
}

//! Canonical transcript types.
//!
//! The transcription adapter produces a [`TranscriptionResult`] of ordered
//! segments with word-level timestamps; the builder folds it into the
//! pause-annotated [`builder::AnnotatedTranscript`] that every analyzer
//! consumes.

pub mod builder;

pub use builder::{AnnotatedTranscript, PauseSource, Token, TranscriptBuilder};

use serde::{Deserialize, Serialize};

/// A single word with its time alignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordToken {
    /// The word text as transcribed, surrounding whitespace trimmed.
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Recognizer confidence in [0, 1] when the backend reports one.
    pub confidence: Option<f32>,
}

/// One recognizer segment with its word alignments.
///
/// Invariants upheld by the transcription adapter: `start <= end`, words
/// are monotonically ordered within the segment, `start` does not exceed
/// the first word's start and the last word's end does not exceed `end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Segment start time in seconds.
    pub start: f64,
    /// Segment end time in seconds.
    pub end: f64,
    /// Plain segment text.
    pub text: String,
    /// Word alignments in segment order.
    pub words: Vec<WordToken>,
    /// Segment-level recognizer confidence when reported.
    pub confidence: Option<f32>,
}

/// Ordered, non-overlapping recognizer output for one audio file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    /// Segments in temporal order.
    pub segments: Vec<Segment>,
}

impl TranscriptionResult {
    /// Concatenated plain text across segments.
    pub fn text(&self) -> String {
        let joined = self
            .segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        joined
    }

    /// Flat view over all word tokens in temporal order.
    pub fn words(&self) -> impl Iterator<Item = &WordToken> {
        self.segments.iter().flat_map(|s| s.words.iter())
    }

    /// Total word count across segments.
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    /// End time of the last segment, or zero for an empty result.
    pub fn end_time(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// Mean of the available confidence values, if any were reported.
    ///
    /// Word-level confidences take precedence; segment confidences are the
    /// fallback for backends that only report per-segment values.
    pub fn mean_confidence(&self) -> Option<f32> {
        let word_scores: Vec<f32> = self
            .words()
            .filter_map(|w| w.confidence)
            .collect();
        let scores = if word_scores.is_empty() {
            self.segments.iter().filter_map(|s| s.confidence).collect()
        } else {
            word_scores
        };
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f32>() / scores.len() as f32)
        }
    }
}

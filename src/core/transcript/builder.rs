//! Transcript builder: folds word timestamps into a pause-annotated stream.
//!
//! Gaps of at least 1.0 s between consecutive words inside a segment, and
//! gaps of at least 2.0 s between consecutive segments, become explicit
//! [`Token::Pause`] entries. Pause durations are rounded to one decimal so
//! that the textual form `[<d> second pause]` round-trips exactly.

use super::TranscriptionResult;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum silent gap between words of one segment that counts as a pause.
pub const INTRA_SEGMENT_PAUSE_THRESHOLD: f64 = 1.0;
/// Minimum silent gap between two segments that counts as a pause.
pub const INTER_SEGMENT_PAUSE_THRESHOLD: f64 = 2.0;
/// Floor applied to speaking time to keep rate computations finite.
pub const MIN_SPEAKING_TIME: f64 = 0.1;

static PAUSE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+\.\d) second pause\]$").unwrap());

/// Where a detected pause sits relative to the recognizer segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseSource {
    /// Gap between two words of the same segment.
    IntraSegment,
    /// Gap between the last word of a segment and the first of the next.
    InterSegment,
}

/// One element of the annotated token stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// A spoken word with its time alignment.
    Word {
        /// Word text, whitespace trimmed.
        text: String,
        /// Start time in seconds.
        start: f64,
        /// End time in seconds.
        end: f64,
    },
    /// A silent gap that crossed the classification threshold.
    Pause {
        /// Gap duration in seconds, rounded to one decimal.
        duration_s: f64,
        /// Intra- or inter-segment classification.
        source: PauseSource,
    },
}

/// Pause-annotated token stream with derived timing metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedTranscript {
    /// Word and pause tokens in temporal order.
    pub tokens: Vec<Token>,
    /// Number of emitted pause tokens.
    pub pause_count: usize,
    /// Sum of emitted pause durations in seconds.
    pub total_pause_time: f64,
    /// Audio duration minus pause time, clamped to [`MIN_SPEAKING_TIME`].
    pub speaking_time: f64,
    /// Number of word tokens.
    pub word_count: usize,
    /// Words per second of speaking time.
    pub speaking_rate: f64,
}

impl AnnotatedTranscript {
    /// Plain text without pause markers.
    pub fn plain_text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word { text, .. } => Some(text.as_str()),
                Token::Pause { .. } => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the token stream with `[<d> second pause]` markers.
    ///
    /// The marker form is a stable contract: parsing the rendered string
    /// with [`TranscriptBuilder::parse_annotated`] yields the same token
    /// sequence (word timings are not representable in text and reset to
    /// zero on re-parse).
    pub fn annotated_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| match t {
                Token::Word { text, .. } => text.clone(),
                Token::Pause { duration_s, .. } => format_pause_marker(*duration_s),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Iterator over the word tokens only.
    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Word { .. }))
    }

    /// Pause durations grouped by source.
    pub fn pauses(&self) -> impl Iterator<Item = (f64, PauseSource)> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            Token::Pause { duration_s, source } => Some((*duration_s, *source)),
            _ => None,
        })
    }
}

/// Render one pause marker with exactly one decimal place.
pub fn format_pause_marker(duration_s: f64) -> String {
    format!("[{:.1} second pause]", duration_s)
}

/// Folds a [`TranscriptionResult`] into an [`AnnotatedTranscript`].
pub struct TranscriptBuilder {
    intra_threshold: f64,
    inter_threshold: f64,
}

impl Default for TranscriptBuilder {
    fn default() -> Self {
        Self {
            intra_threshold: INTRA_SEGMENT_PAUSE_THRESHOLD,
            inter_threshold: INTER_SEGMENT_PAUSE_THRESHOLD,
        }
    }
}

impl TranscriptBuilder {
    /// Create a builder with the default pause thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the recognizer output into the annotated token stream.
    ///
    /// `audio_duration_s` is the probed duration; when it is zero (probe
    /// failure) the last segment end is used as a stand-in so the derived
    /// metrics stay meaningful.
    pub fn build(
        &self,
        transcription: &TranscriptionResult,
        audio_duration_s: f64,
    ) -> AnnotatedTranscript {
        let mut tokens = Vec::new();
        let mut pause_count = 0usize;
        let mut total_pause_time = 0.0f64;

        let segments = &transcription.segments;
        for (i, segment) in segments.iter().enumerate() {
            for (j, word) in segment.words.iter().enumerate() {
                tokens.push(Token::Word {
                    text: word.word.trim().to_string(),
                    start: word.start,
                    end: word.end,
                });

                if let Some(next) = segment.words.get(j + 1) {
                    let gap = next.start - word.end;
                    if gap >= self.intra_threshold {
                        let duration = round1(gap);
                        tokens.push(Token::Pause {
                            duration_s: duration,
                            source: PauseSource::IntraSegment,
                        });
                        pause_count += 1;
                        total_pause_time += duration;
                    }
                }
            }

            if let Some(next_segment) = segments.get(i + 1) {
                let gap = next_segment.start - segment.end;
                if gap >= self.inter_threshold {
                    let duration = round1(gap);
                    tokens.push(Token::Pause {
                        duration_s: duration,
                        source: PauseSource::InterSegment,
                    });
                    pause_count += 1;
                    total_pause_time += duration;
                }
            }
        }

        let duration = if audio_duration_s > 0.0 {
            audio_duration_s
        } else {
            transcription.end_time()
        };
        let speaking_time = (duration - total_pause_time).max(MIN_SPEAKING_TIME);
        let word_count = tokens
            .iter()
            .filter(|t| matches!(t, Token::Word { .. }))
            .count();
        let speaking_rate = word_count as f64 / speaking_time;

        debug!(
            "Annotated transcript: {} words, {} pauses ({:.1}s), speaking {:.1}s, rate {:.2} w/s",
            word_count, pause_count, total_pause_time, speaking_time, speaking_rate
        );

        AnnotatedTranscript {
            tokens,
            pause_count,
            total_pause_time: round1(total_pause_time),
            speaking_time,
            word_count,
            speaking_rate,
        }
    }

    /// Re-parse an annotated text back into a token sequence.
    ///
    /// The inverse of [`AnnotatedTranscript::annotated_text`] for the token
    /// kinds and pause durations; word timings are not encoded in text and
    /// come back as zero.
    pub fn parse_annotated(text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = text.trim();
        while !rest.is_empty() {
            if rest.starts_with('[') {
                if let Some(close) = rest.find(']') {
                    let candidate = &rest[..=close];
                    if let Some(caps) = PAUSE_MARKER_RE.captures(candidate) {
                        let duration: f64 = caps[1].parse().unwrap_or(0.0);
                        // Re-parsed markers keep the textual duration; the
                        // source distinction is not encoded, intra is the
                        // conservative default.
                        tokens.push(Token::Pause {
                            duration_s: duration,
                            source: PauseSource::IntraSegment,
                        });
                        rest = rest[close + 1..].trim_start();
                        continue;
                    }
                }
            }
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..end];
            tokens.push(Token::Word {
                text: word.to_string(),
                start: 0.0,
                end: 0.0,
            });
            rest = rest[end..].trim_start();
        }
        tokens
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::{Segment, WordToken};

    fn word(text: &str, start: f64, end: f64) -> WordToken {
        WordToken {
            word: text.to_string(),
            start,
            end,
            confidence: None,
        }
    }

    fn segment(start: f64, end: f64, words: Vec<WordToken>) -> Segment {
        let text = words
            .iter()
            .map(|w| w.word.clone())
            .collect::<Vec<_>>()
            .join(" ");
        Segment {
            start,
            end,
            text,
            words,
            confidence: None,
        }
    }

    #[test]
    fn test_intra_segment_pause_at_threshold() {
        let transcription = TranscriptionResult {
            segments: vec![segment(
                0.0,
                4.0,
                vec![word("one", 0.0, 1.0), word("two", 2.0, 3.0)],
            )],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 4.0);
        assert_eq!(annotated.pause_count, 1);
        assert_eq!(annotated.total_pause_time, 1.0);
    }

    #[test]
    fn test_gap_just_below_threshold_discarded() {
        let transcription = TranscriptionResult {
            segments: vec![segment(
                0.0,
                4.0,
                vec![word("one", 0.0, 1.0), word("two", 1.999, 3.0)],
            )],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 4.0);
        assert_eq!(annotated.pause_count, 0);
        assert_eq!(annotated.total_pause_time, 0.0);
    }

    #[test]
    fn test_inter_segment_threshold() {
        let transcription = TranscriptionResult {
            segments: vec![
                segment(0.0, 2.0, vec![word("first", 0.0, 2.0)]),
                segment(4.3, 6.0, vec![word("second", 4.3, 6.0)]),
            ],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 6.0);
        assert_eq!(annotated.pause_count, 1);
        assert_eq!(annotated.total_pause_time, 2.3);
        let sources: Vec<_> = annotated.pauses().map(|(_, s)| s).collect();
        assert_eq!(sources, vec![PauseSource::InterSegment]);
    }

    #[test]
    fn test_inter_segment_gap_below_threshold_discarded() {
        let transcription = TranscriptionResult {
            segments: vec![
                segment(0.0, 2.0, vec![word("first", 0.0, 2.0)]),
                segment(3.9, 6.0, vec![word("second", 3.9, 6.0)]),
            ],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 6.0);
        assert_eq!(annotated.pause_count, 0);
    }

    #[test]
    fn test_speaking_time_clamped() {
        let transcription = TranscriptionResult {
            segments: vec![segment(
                0.0,
                12.0,
                vec![word("a", 0.0, 0.5), word("b", 11.5, 12.0)],
            )],
        };
        // 11 second pause against a 10 second duration forces the clamp.
        let annotated = TranscriptBuilder::new().build(&transcription, 10.0);
        assert_eq!(annotated.speaking_time, MIN_SPEAKING_TIME);
        assert!(annotated.speaking_rate > 0.0);
    }

    #[test]
    fn test_marker_format_one_decimal() {
        assert_eq!(format_pause_marker(1.4), "[1.4 second pause]");
        assert_eq!(format_pause_marker(2.0), "[2.0 second pause]");
        assert_eq!(format_pause_marker(12.34), "[12.3 second pause]");
    }

    #[test]
    fn test_annotated_text_round_trip() {
        let transcription = TranscriptionResult {
            segments: vec![segment(
                0.0,
                8.0,
                vec![
                    word("hello", 0.0, 0.5),
                    word("there", 2.0, 2.5),
                    word("friend", 2.6, 3.0),
                ],
            )],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 8.0);
        let text = annotated.annotated_text();
        assert_eq!(text, "hello [1.5 second pause] there friend");

        let reparsed = TranscriptBuilder::parse_annotated(&text);
        assert_eq!(reparsed.len(), annotated.tokens.len());
        for (a, b) in annotated.tokens.iter().zip(reparsed.iter()) {
            match (a, b) {
                (Token::Word { text: ta, .. }, Token::Word { text: tb, .. }) => {
                    assert_eq!(ta, tb)
                }
                (
                    Token::Pause { duration_s: da, .. },
                    Token::Pause { duration_s: db, .. },
                ) => assert_eq!(da, db),
                _ => panic!("token kind mismatch"),
            }
        }

        // Rendering the re-parsed stream reproduces the same text.
        let rerendered = reparsed
            .iter()
            .map(|t| match t {
                Token::Word { text, .. } => text.clone(),
                Token::Pause { duration_s, .. } => format_pause_marker(*duration_s),
            })
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rerendered, text);
    }

    #[test]
    fn test_time_accounting_invariant() {
        let transcription = TranscriptionResult {
            segments: vec![
                segment(0.0, 3.0, vec![word("a", 0.0, 1.0), word("b", 2.5, 3.0)]),
                segment(6.0, 8.0, vec![word("c", 6.0, 8.0)]),
            ],
        };
        let duration = 8.0;
        let annotated = TranscriptBuilder::new().build(&transcription, duration);
        assert!(annotated.total_pause_time + annotated.speaking_time >= duration - 0.2);
        assert!(annotated.speaking_time >= MIN_SPEAKING_TIME);
    }

    #[test]
    fn test_empty_transcription() {
        let annotated = TranscriptBuilder::new().build(&TranscriptionResult::default(), 5.0);
        assert_eq!(annotated.word_count, 0);
        assert_eq!(annotated.pause_count, 0);
        assert_eq!(annotated.plain_text(), "");
    }

    #[test]
    fn test_probe_failure_falls_back_to_segment_end() {
        let transcription = TranscriptionResult {
            segments: vec![segment(0.0, 5.0, vec![word("a", 0.0, 5.0)])],
        };
        let annotated = TranscriptBuilder::new().build(&transcription, 0.0);
        assert!((annotated.speaking_time - 5.0).abs() < f64::EPSILON);
    }
}

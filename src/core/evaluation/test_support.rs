//! Shared fixtures for analyzer and aggregation unit tests.

use crate::config::Config;
use crate::core::evaluation::{Artifacts, GenderHint, RequestMetadata};
use crate::core::reference::ReferenceData;
use crate::core::transcript::{Segment, TranscriptBuilder, TranscriptionResult, WordToken};
use crate::services::audio::AudioRef;
use crate::services::features::FeatureLoader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One-segment transcription from `(word, start, end)` triples.
pub fn transcription_from_words(words: &[(&str, f64, f64)]) -> TranscriptionResult {
    if words.is_empty() {
        return TranscriptionResult::default();
    }
    let tokens: Vec<WordToken> = words
        .iter()
        .map(|(word, start, end)| WordToken {
            word: word.to_string(),
            start: *start,
            end: *end,
            confidence: None,
        })
        .collect();
    let text = words
        .iter()
        .map(|(w, _, _)| *w)
        .collect::<Vec<_>>()
        .join(" ");
    TranscriptionResult {
        segments: vec![Segment {
            start: tokens.first().unwrap().start,
            end: tokens.last().unwrap().end,
            text,
            words: tokens,
            confidence: None,
        }],
    }
}

/// Transcription whose words are evenly spread over the duration.
pub fn transcription_from_text(text: &str, duration_s: f64) -> TranscriptionResult {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return TranscriptionResult::default();
    }
    let step = duration_s / words.len() as f64;
    let triples: Vec<(&str, f64, f64)> = words
        .iter()
        .enumerate()
        .map(|(i, w)| (*w, i as f64 * step, i as f64 * step + step * 0.8))
        .collect();
    transcription_from_words(&triples)
}

/// Builder for [`Artifacts`] fixtures.
pub struct ArtifactsBuilder {
    audio_path: PathBuf,
    audio_duration_s: f64,
    transcription: TranscriptionResult,
    topic: Option<String>,
    speech_type: Option<String>,
    expected_duration: Option<String>,
    actual_duration_s: Option<f64>,
    gender_hint: GenderHint,
    domain: String,
    config: Config,
}

impl Default for ArtifactsBuilder {
    fn default() -> Self {
        Self {
            audio_path: PathBuf::from("fixture.wav"),
            audio_duration_s: 60.0,
            transcription: transcription_from_text(
                "today i will discuss a topic that matters to everyone here",
                10.0,
            ),
            topic: None,
            speech_type: None,
            expected_duration: None,
            actual_duration_s: None,
            gender_hint: GenderHint::Auto,
            domain: "general".to_string(),
            config: Config::default(),
        }
    }
}

impl ArtifactsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audio_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.audio_path = path.into();
        self
    }

    pub fn audio_duration(mut self, seconds: f64) -> Self {
        self.audio_duration_s = seconds;
        self
    }

    pub fn transcription(mut self, transcription: TranscriptionResult) -> Self {
        self.transcription = transcription;
        self
    }

    pub fn topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }

    pub fn speech_type(mut self, speech_type: &str) -> Self {
        self.speech_type = Some(speech_type.to_string());
        self
    }

    pub fn expected_duration(mut self, expected: &str) -> Self {
        self.expected_duration = Some(expected.to_string());
        self
    }

    pub fn actual_duration_s(mut self, seconds: f64) -> Self {
        self.actual_duration_s = Some(seconds);
        self
    }

    pub fn gender_hint(mut self, hint: GenderHint) -> Self {
        self.gender_hint = hint;
        self
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Artifacts {
        let audio = AudioRef {
            path: self.audio_path,
            sample_rate: 16_000,
            channels: 1,
            duration_s: self.audio_duration_s,
        };
        let cancel = CancellationToken::new();
        let transcript = TranscriptBuilder::new().build(&self.transcription, self.audio_duration_s);
        Artifacts {
            features: Arc::new(FeatureLoader::new(audio.clone(), cancel.clone())),
            audio,
            transcription: self.transcription,
            transcript,
            metadata: RequestMetadata {
                request_id: Uuid::new_v4(),
                topic: self.topic,
                speech_type: self.speech_type,
                expected_duration: self.expected_duration,
                actual_duration_s: self.actual_duration_s,
                gender_hint: self.gender_hint,
                domain: self.domain,
            },
            reference: Arc::new(ReferenceData::builtin()),
            config: Arc::new(self.config),
            cancel,
        }
    }
}

/// Quick fixture with an optional topic.
pub fn test_artifacts(topic: Option<&str>) -> Artifacts {
    let mut builder = ArtifactsBuilder::new();
    if let Some(topic) = topic {
        builder = builder.topic(topic);
    }
    builder.build()
}

//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use vocalis_cli::Result;
use vocalis_cli::core::transcript::{Segment, TranscriptionResult, WordToken};
use vocalis_cli::services::audio::AudioRef;
use vocalis_cli::services::whisper::Transcriber;

/// Write a sine-tone WAV file for probe and feature extraction tests.
pub fn write_test_wav(path: &Path, seconds: f64, frequency: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..(seconds * 16_000.0) as usize {
        let t = i as f32 / 16_000.0;
        let sample = (t * frequency * std::f32::consts::TAU).sin();
        writer.write_sample((sample * 12_000.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Temp directory with one tone WAV inside; returns (dir, path).
pub fn tone_fixture(seconds: f64) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speech.wav");
    write_test_wav(&path, seconds, 130.0);
    (dir, path)
}

/// Build a one-segment transcription from `(word, start, end)` triples.
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
    TranscriptionResult {
        segments: vec![Segment {
            start: tokens.first().unwrap().start,
            end: tokens.last().unwrap().end,
            text: words.iter().map(|(w, _, _)| *w).collect::<Vec<_>>().join(" "),
            words: tokens,
            confidence: None,
        }],
    }
}

/// Transcription whose words spread evenly over the duration.
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

/// Transcriber returning a fixed canned result.
pub struct FixedTranscriber {
    pub result: TranscriptionResult,
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio: &AudioRef) -> Result<TranscriptionResult> {
        Ok(self.result.clone())
    }
}

/// Convenience constructor.
pub fn fixed_transcriber(result: TranscriptionResult) -> Arc<FixedTranscriber> {
    Arc::new(FixedTranscriber { result })
}

/// A realistic short speech used across pipeline tests.
pub fn sample_speech_text() -> &'static str {
    "good morning everyone today i will explain why renewable energy matters to every \
     community first solar panels keep getting cheaper each year second wind turbines \
     now scale from rooftops to offshore farms moreover battery storage improves \
     constantly therefore the grid grows more resilient in conclusion renewable energy \
     will power our shared future thank you"
}

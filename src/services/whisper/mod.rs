//! Transcription adapter for OpenAI-compatible Whisper endpoints.
//!
//! The adapter requests verbatim transcription with word-level timestamps
//! and normalizes the wire response into the canonical
//! [`TranscriptionResult`](crate::core::transcript::TranscriptionResult),
//! repairing timestamp monotonicity on the way.

mod client;

pub use client::{WhisperApiTranscriber, WhisperResponse, WhisperSegment, WhisperWord};

use crate::Result;
use crate::core::transcript::TranscriptionResult;
use crate::services::audio::AudioRef;
use async_trait::async_trait;

/// Abstraction over the external speech-to-text model.
///
/// The pipeline only depends on this trait; the production implementation
/// is [`WhisperApiTranscriber`], tests substitute their own.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the referenced audio with word-level timestamps.
    async fn transcribe(&self, audio: &AudioRef) -> Result<TranscriptionResult>;
}

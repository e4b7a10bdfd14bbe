//! Request-scoped artifacts shared read-only across analyzers.

use crate::config::Config;
use crate::core::reference::ReferenceData;
use crate::core::transcript::{AnnotatedTranscript, TranscriptionResult};
use crate::services::audio::AudioRef;
use crate::services::features::FeatureLoader;
use crate::{Result, error::VocalisError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// One evaluation request as received from the caller.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    /// Path to the audio artifact.
    pub audio_path: PathBuf,
    /// Topic the speech was supposed to address.
    pub topic: Option<String>,
    /// Free-form speech category (e.g. "Prepared Speech").
    pub speech_type: Option<String>,
    /// Expected duration string of shape `"A[-B] minutes"`.
    pub expected_duration: Option<String>,
    /// Caller-reported actual duration as `MM:SS`; the probe duration is
    /// used when absent.
    pub actual_duration: Option<String>,
    /// Gender hint: "male", "female", or "auto".
    pub gender_hint: Option<String>,
    /// Domain profile name; unknown names resolve to `general`.
    pub domain: String,
}

impl EvaluationRequest {
    /// Minimal request for the given audio path.
    pub fn new<P: Into<PathBuf>>(audio_path: P) -> Self {
        Self {
            audio_path: audio_path.into(),
            topic: None,
            speech_type: None,
            expected_duration: None,
            actual_duration: None,
            gender_hint: None,
            domain: "general".to_string(),
        }
    }

    /// Parse the caller-reported `MM:SS` duration into seconds.
    ///
    /// # Errors
    ///
    /// Returns an [`VocalisError::Input`] for malformed values; an absent
    /// duration is `Ok(None)`.
    pub fn actual_duration_seconds(&self) -> Result<Option<f64>> {
        let Some(raw) = self.actual_duration.as_deref() else {
            return Ok(None);
        };
        let parts: Vec<&str> = raw.trim().split(':').collect();
        if parts.len() != 2 {
            return Err(VocalisError::input(format!(
                "actual_duration must be MM:SS, got '{}'",
                raw
            )));
        }
        let minutes: u32 = parts[0].parse().map_err(|_| {
            VocalisError::input(format!("invalid minutes in actual_duration '{}'", raw))
        })?;
        let seconds: u32 = parts[1].parse().map_err(|_| {
            VocalisError::input(format!("invalid seconds in actual_duration '{}'", raw))
        })?;
        if seconds >= 60 {
            return Err(VocalisError::input(format!(
                "seconds field must be below 60 in actual_duration '{}'",
                raw
            )));
        }
        Ok(Some((minutes * 60 + seconds) as f64))
    }
}

/// Gender hint resolved against the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderHint {
    Male,
    Female,
    Auto,
}

impl GenderHint {
    /// Parse a hint string, falling back to the configured default and
    /// finally to auto-detection.
    pub fn resolve(request_hint: Option<&str>, config_default: &str) -> Self {
        let effective = request_hint.unwrap_or(config_default);
        match effective.to_lowercase().as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            _ => Self::Auto,
        }
    }
}

/// Request metadata carried alongside the derived artifacts.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Unique id for log correlation.
    pub request_id: Uuid,
    pub topic: Option<String>,
    pub speech_type: Option<String>,
    pub expected_duration: Option<String>,
    /// Actual duration in seconds: caller-reported when present, probe
    /// duration otherwise.
    pub actual_duration_s: Option<f64>,
    pub gender_hint: GenderHint,
    /// Resolved domain profile name.
    pub domain: String,
}

/// Read-only bundle shared by reference across all analyzers of one
/// request. No analyzer mutates it; the dependency graph inside a request
/// is a star centered here.
pub struct Artifacts {
    /// Probed audio handle.
    pub audio: AudioRef,
    /// Normalized recognizer output.
    pub transcription: TranscriptionResult,
    /// Pause-annotated token stream.
    pub transcript: AnnotatedTranscript,
    /// Lazy acoustic feature loader.
    pub features: Arc<FeatureLoader>,
    /// Request metadata.
    pub metadata: RequestMetadata,
    /// Process-wide reference tables.
    pub reference: Arc<ReferenceData>,
    /// Active configuration snapshot.
    pub config: Arc<Config>,
    /// Request-level cancellation token.
    pub cancel: CancellationToken,
}

impl Artifacts {
    /// Duration analyzers should reason about: caller-reported when
    /// present, probe duration otherwise.
    pub fn effective_duration_s(&self) -> f64 {
        self.metadata
            .actual_duration_s
            .unwrap_or(self.audio.duration_s)
    }
}

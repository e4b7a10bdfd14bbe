//! The evaluation orchestrator.
//!
//! One entry point drives the whole pipeline: probe the audio, request
//! the verbatim transcription, fold it into the annotated transcript,
//! fan the analyzers out over the shared artifacts, and aggregate their
//! results. Only input validation and transcription failures abort a
//! request; everything downstream degrades in place.

use super::aggregator::{rating_label, Aggregator};
use super::artifacts::{Artifacts, EvaluationRequest, GenderHint, RequestMetadata};
use super::report::{EvaluationReport, TranscriptSummary};
use crate::config::Config;
use crate::core::analyzers::registry::AnalyzerRegistry;
use crate::core::analyzers::timing::DurationRange;
use crate::core::reference;
use crate::core::transcript::TranscriptBuilder;
use crate::services::audio::{AudioProbe, AudioRef};
use crate::services::features::FeatureLoader;
use crate::services::whisper::Transcriber;
use crate::{Result, error::VocalisError};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Drives evaluation requests through the pipeline.
pub struct Orchestrator {
    config: Arc<Config>,
    transcriber: Arc<dyn Transcriber>,
    registry: AnalyzerRegistry,
    request_slots: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create an orchestrator with the default analyzer set.
    pub fn new(config: Config, transcriber: Arc<dyn Transcriber>) -> Self {
        let slots = config.general.max_concurrent_requests.max(1);
        Self {
            config: Arc::new(config),
            transcriber,
            registry: AnalyzerRegistry::with_default_analyzers(),
            request_slots: Arc::new(Semaphore::new(slots)),
        }
    }

    /// Create an orchestrator with a custom registry (tests).
    pub fn with_registry(
        config: Config,
        transcriber: Arc<dyn Transcriber>,
        registry: AnalyzerRegistry,
    ) -> Self {
        let slots = config.general.max_concurrent_requests.max(1);
        Self {
            config: Arc::new(config),
            transcriber,
            registry,
            request_slots: Arc::new(Semaphore::new(slots)),
        }
    }

    /// Evaluate one request end to end.
    ///
    /// # Errors
    ///
    /// Returns [`VocalisError::Input`] for malformed request fields and
    /// [`VocalisError::Transcription`] when the transcription adapter
    /// fails; analyzer and feature problems never abort the request.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationReport> {
        let _slot = self
            .request_slots
            .acquire()
            .await
            .map_err(|_| VocalisError::input("orchestrator is shutting down"))?;

        let request_id = Uuid::new_v4();
        info!(
            "[{}] Evaluating {:?} (topic: {:?}, domain: {})",
            request_id, request.audio_path, request.topic, request.domain
        );

        // Input validation happens before any expensive work.
        if let Some(expected) = request.expected_duration.as_deref() {
            DurationRange::parse(expected)?;
        }
        let reported_duration = request.actual_duration_seconds()?;
        if !request.audio_path.exists() {
            return Err(VocalisError::input(format!(
                "audio file not found: {}",
                request.audio_path.display()
            )));
        }

        // Probe; an unreadable container is tolerated with a zero
        // duration so that transcription still gets its chance.
        let audio = match AudioProbe::probe(&request.audio_path) {
            Ok(audio) => audio,
            Err(e) => {
                warn!("[{}] Audio probe failed: {}", request_id, e);
                AudioRef {
                    path: request.audio_path.clone(),
                    sample_rate: 0,
                    channels: 0,
                    duration_s: 0.0,
                }
            }
        };

        let transcription = self
            .transcriber
            .transcribe(&audio)
            .await
            .map_err(|e| VocalisError::transcription(e.to_string()))?;
        debug!(
            "[{}] Transcription: {} segments, {} words",
            request_id,
            transcription.segments.len(),
            transcription.word_count()
        );

        let transcript = TranscriptBuilder::new().build(&transcription, audio.duration_s);

        let cancel = CancellationToken::new();
        let metadata = RequestMetadata {
            request_id,
            topic: request.topic.clone(),
            speech_type: request.speech_type.clone(),
            expected_duration: request.expected_duration.clone(),
            actual_duration_s: reported_duration.or(if audio.duration_s > 0.0 {
                Some(audio.duration_s)
            } else {
                None
            }),
            gender_hint: GenderHint::resolve(
                request.gender_hint.as_deref(),
                &self.config.analysis.gender_hint_default,
            ),
            domain: request.domain.clone(),
        };

        let artifacts = Arc::new(Artifacts {
            features: Arc::new(FeatureLoader::new(audio.clone(), cancel.clone())),
            audio,
            transcription,
            transcript,
            metadata,
            reference: reference::reference_data(),
            config: Arc::clone(&self.config),
            cancel: cancel.clone(),
        });

        let results = self
            .registry
            .run_all(
                Arc::clone(&artifacts),
                self.config.general.worker_count,
                Duration::from_millis(self.config.general.analyzer_timeout_ms),
            )
            .await;
        // Stop any feature computation still in flight for this request.
        cancel.cancel();

        let aggregator = Aggregator::new(self.config.analysis.weights.clone());
        let final_score = aggregator.final_score(&results);
        let suggestions = aggregator.suggestions(
            &results,
            &artifacts.transcript,
            artifacts.effective_duration_s(),
        );

        info!(
            "[{}] Final score {:.0} ({})",
            request_id,
            final_score,
            rating_label(final_score)
        );

        Ok(EvaluationReport {
            final_score: final_score.round() as i64,
            rating: rating_label(final_score).to_string(),
            component_scores: aggregator.component_scores(&results),
            analyzers: results,
            suggestions,
            transcript: TranscriptSummary::from(&artifacts.transcript),
        })
    }
}

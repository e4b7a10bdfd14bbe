use crate::config::TranscriberConfig;
use crate::core::transcript::{Segment, TranscriptionResult, WordToken};
use crate::services::audio::AudioRef;
use crate::{Result, error::VocalisError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, multipart::Form};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};

/// Initial prompt steering the model toward verbatim output. Filler words
/// and false starts must survive transcription or the disfluency analysis
/// has nothing to measure.
const VERBATIM_PROMPT: &str = "Please transcribe exactly as spoken. Include every um, uh, ah, er, \
     pause, repetition, and false start. Do not clean up or correct the \
     speech. Transcribe with maximum verbatim accuracy.";

/// OpenAI Whisper API transcription client.
pub struct WhisperApiTranscriber {
    client: Client,
    api_key: String,
    base_url: String,
    config: TranscriberConfig,
}

impl WhisperApiTranscriber {
    /// Create a Whisper API client from the transcriber configuration.
    pub fn new(api_key: String, base_url: String, config: TranscriberConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                VocalisError::whisper_api(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url,
            config,
        })
    }

    /// Transcribe an audio file, retrying transient failures.
    async fn transcribe_with_retry(&self, audio_path: &Path) -> Result<WhisperResponse> {
        let mut retries = 0;
        let mut last_error = None;

        while retries <= self.config.max_retries {
            match self.try_transcribe(audio_path).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!(
                        "Transcription attempt {} failed: {}",
                        retries + 1,
                        e
                    );
                    last_error = Some(e);
                    if retries < self.config.max_retries {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                        retries += 1;
                        continue;
                    }
                    break;
                }
            }
        }
        Err(last_error.unwrap_or_else(|| VocalisError::whisper_api("Unknown Whisper API error")))
    }

    async fn try_transcribe(&self, audio_path: &Path) -> Result<WhisperResponse> {
        let file = File::open(audio_path).await.map_err(|e| {
            VocalisError::audio_processing(format!("Failed to open audio file: {}", e))
        })?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let filename = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());
        let mut form = Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("prompt", VERBATIM_PROMPT)
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment")
            .part(
                "file",
                reqwest::multipart::Part::stream(body)
                    .file_name(filename)
                    .mime_str("audio/wav")?,
            );

        if self.config.language != "auto" {
            form = form.text("language", self.config.language.clone());
        }
        if self.config.temperature > 0.0 {
            form = form.text("temperature", self.config.temperature.to_string());
        }

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                VocalisError::whisper_api(format!("Whisper API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(VocalisError::whisper_api(format!(
                "Whisper API error {}: {}",
                status, text
            )));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            VocalisError::whisper_api(format!("Failed to parse Whisper response: {}", e))
        })?;
        Ok(result)
    }
}

#[async_trait]
impl super::Transcriber for WhisperApiTranscriber {
    async fn transcribe(&self, audio: &AudioRef) -> Result<TranscriptionResult> {
        debug!("Requesting verbatim transcription for {:?}", audio.path);
        let response = self
            .transcribe_with_retry(&audio.path)
            .await
            .map_err(|e| VocalisError::transcription(e.to_string()))?;
        let result = normalize_response(response);
        debug!(
            "Transcription normalized: {} segments, {} words",
            result.segments.len(),
            result.word_count()
        );
        Ok(result)
    }
}

/// Whisper API response structure (verbose_json).
#[derive(Debug, Deserialize)]
pub struct WhisperResponse {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<WhisperSegment>,
    #[serde(default)]
    pub words: Option<Vec<WhisperWord>>,
}

/// Whisper API segment.
#[derive(Debug, Deserialize)]
pub struct WhisperSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Option<Vec<WhisperWord>>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Whisper API word timestamp.
#[derive(Debug, Deserialize, Clone)]
pub struct WhisperWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Normalize the wire response into the canonical result, attaching
/// top-level word timestamps to their covering segments when the backend
/// did not nest them, then repairing monotonicity.
pub fn normalize_response(response: WhisperResponse) -> TranscriptionResult {
    let flat_words = response.words.unwrap_or_default();
    let mut segments: Vec<Segment> = Vec::with_capacity(response.segments.len());

    for seg in response.segments {
        let words: Vec<WordToken> = match seg.words {
            Some(ws) => ws.into_iter().map(word_token).collect(),
            None => flat_words
                .iter()
                .filter(|w| w.start >= seg.start - f64::EPSILON && w.end <= seg.end + f64::EPSILON)
                .cloned()
                .map(word_token)
                .collect(),
        };
        segments.push(Segment {
            start: seg.start,
            end: seg.end,
            text: seg.text.trim().to_string(),
            words,
            confidence: seg.confidence,
        });
    }

    let mut result = TranscriptionResult { segments };
    repair_monotonicity(&mut result);
    result
}

fn word_token(w: WhisperWord) -> WordToken {
    WordToken {
        word: w.word.trim().to_string(),
        start: w.start,
        end: w.end,
        confidence: w.confidence,
    }
}

/// Clamp any `word.start < previous.end` to the previous end and keep
/// `end >= start` within each word, across segment boundaries too.
pub fn repair_monotonicity(result: &mut TranscriptionResult) {
    let mut previous_end = 0.0f64;
    for segment in &mut result.segments {
        for word in &mut segment.words {
            if word.start < previous_end {
                debug!(
                    "Clamping word '{}' start {:.3} to previous end {:.3}",
                    word.word, word.start, previous_end
                );
                word.start = previous_end;
            }
            if word.end < word.start {
                word.end = word.start;
            }
            previous_end = word.end;
        }
        if segment.end < segment.start {
            segment.end = segment.start;
        }
    }
}

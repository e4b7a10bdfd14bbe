//! Whisper API client behavior against a mock HTTP server.

mod common;

use common::tone_fixture;
use serde_json::json;
use vocalis_cli::config::TranscriberConfig;
use vocalis_cli::error::VocalisError;
use vocalis_cli::services::audio::AudioRef;
use vocalis_cli::services::whisper::{Transcriber, WhisperApiTranscriber};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn audio_ref(path: std::path::PathBuf) -> AudioRef {
    AudioRef {
        path,
        sample_rate: 16_000,
        channels: 1,
        duration_s: 2.0,
    }
}

fn fast_config() -> TranscriberConfig {
    TranscriberConfig {
        max_retries: 2,
        retry_delay_ms: 10,
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn verbose_json_body() -> serde_json::Value {
    json!({
        "text": "hello world",
        "segments": [{
            "start": 0.0,
            "end": 1.5,
            "text": " hello world",
            "words": [
                {"word": " hello", "start": 0.0, "end": 0.7},
                {"word": " world", "start": 0.6, "end": 1.5}
            ]
        }]
    })
}

#[tokio::test]
async fn successful_transcription_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verbose_json_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, wav) = tone_fixture(1.0);
    let client =
        WhisperApiTranscriber::new("test-key".into(), server.uri(), fast_config()).unwrap();
    let result = client.transcribe(&audio_ref(wav)).await.unwrap();

    assert_eq!(result.segments.len(), 1);
    let words = &result.segments[0].words;
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].word, "hello");
    // The overlapping second word start (0.6 < 0.7) is clamped.
    assert_eq!(words[1].start, 0.7);
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream hiccup"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verbose_json_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, wav) = tone_fixture(1.0);
    let client =
        WhisperApiTranscriber::new("test-key".into(), server.uri(), fast_config()).unwrap();
    let result = client.transcribe(&audio_ref(wav)).await.unwrap();
    assert_eq!(result.word_count(), 2);
}

#[tokio::test]
async fn persistent_failure_surfaces_as_transcription_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&server)
        .await;

    let (_dir, wav) = tone_fixture(1.0);
    let client =
        WhisperApiTranscriber::new("test-key".into(), server.uri(), fast_config()).unwrap();
    let result = client.transcribe(&audio_ref(wav)).await;
    assert!(matches!(result, Err(VocalisError::Transcription { .. })));
}

#[tokio::test]
async fn missing_audio_file_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(verbose_json_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client =
        WhisperApiTranscriber::new("test-key".into(), server.uri(), fast_config()).unwrap();
    let result = client
        .transcribe(&audio_ref("does/not/exist.wav".into()))
        .await;
    assert!(result.is_err());
}

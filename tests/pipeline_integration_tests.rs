//! End-to-end pipeline scenarios through the orchestrator.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vocalis_cli::Result;
use vocalis_cli::config::Config;
use vocalis_cli::core::analyzers::{
    Analyzer, AnalyzerRegistry, AnalyzerResult, AnalyzerStatus, Feature,
};
use vocalis_cli::core::evaluation::{Artifacts, EvaluationRequest, Orchestrator};

fn request(path: &std::path::Path) -> EvaluationRequest {
    let mut request = EvaluationRequest::new(path);
    request.topic = Some("renewable energy".to_string());
    request.speech_type = Some("Prepared Speech".to_string());
    request.expected_duration = Some("5-7 minutes".to_string());
    request
}

#[tokio::test]
async fn within_range_prepared_speech_scores_timing_high() {
    let (_dir, path) = tone_fixture(2.0);
    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(transcription_from_text(sample_speech_text(), 360.0)),
    );

    let mut req = request(&path);
    req.actual_duration = Some("06:00".to_string());
    let report = orchestrator.evaluate(req).await.unwrap();

    let timing = report
        .analyzers
        .iter()
        .find(|r| r.analyzer_id == "timing")
        .unwrap();
    assert_eq!(timing.status, AnalyzerStatus::Ok);
    assert!(
        (90.0..=100.0).contains(&timing.score),
        "timing score {} outside [90, 100]",
        timing.score
    );
    assert_eq!(
        timing.metrics["status"],
        vocalis_cli::core::analyzers::MetricValue::Text("within_range".to_string())
    );
}

#[tokio::test]
async fn missing_topic_skips_effectiveness_and_redistributes() {
    let (_dir, path) = tone_fixture(2.0);
    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(transcription_from_text(sample_speech_text(), 60.0)),
    );

    let mut req = request(&path);
    req.topic = None;
    let report = orchestrator.evaluate(req).await.unwrap();

    let effectiveness = report
        .analyzers
        .iter()
        .find(|r| r.analyzer_id == "effectiveness")
        .unwrap();
    assert_eq!(effectiveness.status, AnalyzerStatus::Skipped);
    assert!((0..=100).contains(&report.final_score));
    assert_eq!(report.analyzers.len(), 7);
}

struct StallingAnalyzer;

#[async_trait]
impl Analyzer for StallingAnalyzer {
    fn id(&self) -> &'static str {
        "pronunciation"
    }
    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript]
    }
    async fn analyze(&self, _artifacts: &Artifacts) -> Result<AnalyzerResult> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(AnalyzerResult::ok("pronunciation", 100.0))
    }
}

struct FixedScoreAnalyzer {
    id: &'static str,
    score: f64,
}

#[async_trait]
impl Analyzer for FixedScoreAnalyzer {
    fn id(&self) -> &'static str {
        self.id
    }
    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript]
    }
    async fn analyze(&self, _artifacts: &Artifacts) -> Result<AnalyzerResult> {
        Ok(AnalyzerResult::ok(self.id, self.score))
    }
}

#[tokio::test]
async fn analyzer_timeout_fails_and_rescales_weights() {
    let (_dir, path) = tone_fixture(1.0);

    let mut registry = AnalyzerRegistry::new();
    registry.register(Arc::new(StallingAnalyzer));
    for id in ["structure", "content", "disfluency", "timing", "prosody", "effectiveness"] {
        registry.register(Arc::new(FixedScoreAnalyzer { id, score: 88.0 }));
    }

    let mut config = Config::default();
    config.general.analyzer_timeout_ms = 200;
    let orchestrator = Orchestrator::with_registry(
        config,
        fixed_transcriber(transcription_from_text(sample_speech_text(), 60.0)),
        registry,
    );

    let report = orchestrator.evaluate(request(&path)).await.unwrap();
    let pronunciation = report
        .analyzers
        .iter()
        .find(|r| r.analyzer_id == "pronunciation")
        .unwrap();
    assert_eq!(pronunciation.status, AnalyzerStatus::Failed);
    // All other analyzers scored 88, so the redistributed final must too.
    assert_eq!(report.final_score, 88);
}

#[tokio::test]
async fn empty_transcript_degrades_but_reports() {
    let (_dir, path) = tone_fixture(2.0);
    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(Default::default()),
    );

    let report = orchestrator.evaluate(request(&path)).await.unwrap();
    assert!((0..=100).contains(&report.final_score));
    for id in ["structure", "content", "disfluency"] {
        let result = report
            .analyzers
            .iter()
            .find(|r| r.analyzer_id == id)
            .unwrap();
        assert_eq!(
            result.status,
            AnalyzerStatus::Degraded,
            "{} should degrade on an empty transcript",
            id
        );
    }
}

#[tokio::test]
async fn identical_requests_produce_identical_reports() {
    let (_dir, path) = tone_fixture(3.0);
    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(transcription_from_text(sample_speech_text(), 360.0)),
    );

    let first = orchestrator.evaluate(request(&path)).await.unwrap();
    let second = orchestrator.evaluate(request(&path)).await.unwrap();
    assert_eq!(first.final_score, second.final_score);
    assert_eq!(first.component_scores, second.component_scores);
    assert_eq!(first.suggestions, second.suggestions);
}

#[tokio::test]
async fn gender_auto_on_low_pitched_voice_selects_male_band() {
    // 120 Hz tone: the pitch tracker should put the median around 120
    // and auto-detection should land on the male band.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("low.wav");
    write_test_wav(&path, 3.0, 120.0);

    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(transcription_from_text(sample_speech_text(), 3.0)),
    );
    let report = orchestrator.evaluate(request(&path)).await.unwrap();

    let prosody = report
        .analyzers
        .iter()
        .find(|r| r.analyzer_id == "prosody")
        .unwrap();
    assert_eq!(
        prosody.metrics["detected_gender"],
        vocalis_cli::core::analyzers::MetricValue::Text("male".to_string())
    );
    assert_eq!(
        prosody.metrics["min_recommended_hz"],
        vocalis_cli::core::analyzers::MetricValue::Number(85.0)
    );
    assert_eq!(
        prosody.metrics["max_recommended_hz"],
        vocalis_cli::core::analyzers::MetricValue::Number(180.0)
    );
}

#[tokio::test]
async fn suggestions_are_capped_and_deduplicated() {
    let (_dir, path) = tone_fixture(2.0);
    // A transcript saturated with fillers drives several scores down.
    let mut text = String::new();
    for _ in 0..30 {
        text.push_str("um uh like basically ");
    }
    let orchestrator = Orchestrator::new(
        Config::default(),
        fixed_transcriber(transcription_from_text(&text, 60.0)),
    );

    let report = orchestrator.evaluate(request(&path)).await.unwrap();
    assert!(report.suggestions.len() <= 5);
    let mut unique = report.suggestions.clone();
    unique.dedup();
    assert_eq!(unique.len(), report.suggestions.len());
}

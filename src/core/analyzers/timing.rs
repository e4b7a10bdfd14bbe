//! Timing analyzer: compliance of the actual duration against the
//! expected range.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use crate::{Result, error::VocalisError};
use async_trait::async_trait;
use log::debug;

/// Tolerance below the minimum before a speech counts as too short.
const SHORT_TOLERANCE: f64 = 0.9;
/// Tolerance above the maximum before a speech counts as too long.
const LONG_TOLERANCE: f64 = 1.1;

/// Parsed expected-duration range in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationRange {
    pub min_s: f64,
    pub max_s: f64,
}

impl DurationRange {
    /// Parse an expected duration of shape `"A[-B] minutes"`.
    ///
    /// Accepts both the ASCII hyphen and the en-dash and tolerates a
    /// missing unit word.
    ///
    /// # Errors
    ///
    /// Returns [`VocalisError::Input`] for values that do not contain a
    /// parsable minute count.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.to_lowercase().replace('\u{2013}', "-");
        let numeric_part = normalized
            .replace("minutes", "")
            .replace("minute", "")
            .replace("mins", "")
            .replace("min", "");
        let numeric_part = numeric_part.trim();

        let (min_minutes, max_minutes) = match numeric_part.split_once('-') {
            Some((lo, hi)) => {
                let lo: f64 = parse_minutes(lo, raw)?;
                let hi: f64 = parse_minutes(hi, raw)?;
                (lo, hi)
            }
            None => {
                let value = parse_minutes(numeric_part, raw)?;
                (value, value)
            }
        };
        if min_minutes <= 0.0 || max_minutes < min_minutes {
            return Err(VocalisError::input(format!(
                "expected duration range is not increasing: '{}'",
                raw
            )));
        }
        Ok(Self {
            min_s: min_minutes * 60.0,
            max_s: max_minutes * 60.0,
        })
    }

    /// Midpoint of the range in seconds.
    pub fn center_s(&self) -> f64 {
        (self.min_s + self.max_s) / 2.0
    }
}

fn parse_minutes(text: &str, raw: &str) -> Result<f64> {
    text.trim().parse().map_err(|_| {
        VocalisError::input(format!(
            "expected duration must look like '5-7 minutes', got '{}'",
            raw
        ))
    })
}

/// Compliance classification of one duration against a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingStatus {
    TooShort,
    WithinRange,
    TooLong,
}

impl TimingStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::WithinRange => "within_range",
            Self::TooLong => "too_long",
        }
    }
}

/// Classify a duration and compute the compliance score.
pub fn score_duration(actual_s: f64, range: &DurationRange) -> (TimingStatus, f64) {
    let center = range.center_s();
    if actual_s < range.min_s * SHORT_TOLERANCE {
        let overshoot = (range.min_s - actual_s) / range.min_s;
        let score = (80.0 - overshoot * 100.0).clamp(50.0, 80.0);
        (TimingStatus::TooShort, score)
    } else if actual_s > range.max_s * LONG_TOLERANCE {
        let overshoot = (actual_s - range.max_s) / range.max_s;
        let score = (80.0 - overshoot * 100.0).clamp(50.0, 80.0);
        (TimingStatus::TooLong, score)
    } else {
        let deviation = (actual_s - center).abs() / center;
        let score = (90.0 - deviation * 50.0).clamp(80.0, 100.0);
        (TimingStatus::WithinRange, score)
    }
}

/// Duration-compliance analyzer.
pub struct TimingAnalyzer;

#[async_trait]
impl Analyzer for TimingAnalyzer {
    fn id(&self) -> &'static str {
        "timing"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::ExpectedDuration]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let expected = artifacts
            .metadata
            .expected_duration
            .as_deref()
            .ok_or_else(|| VocalisError::analyzer("timing", "expected duration missing"))?;
        let range = DurationRange::parse(expected)?;

        let actual_s = artifacts.effective_duration_s();
        if actual_s <= 0.0 {
            return Ok(AnalyzerResult::degraded(
                "timing",
                super::DEFAULT_SCORE,
                "audio duration unavailable",
            )
            .with_feedback("Timing compliance could not be measured for this recording."));
        }

        let (status, score) = score_duration(actual_s, &range);
        let center = range.center_s();
        let percentage_deviation = (actual_s - center).abs() / center * 100.0;
        let speech_type = artifacts
            .metadata
            .speech_type
            .clone()
            .unwrap_or_else(|| "speech".to_string())
            .to_lowercase();

        let message = match status {
            TimingStatus::TooShort => format!(
                "Your {} was too short. Aim for {} as required.",
                speech_type, expected
            ),
            TimingStatus::TooLong => format!(
                "Your {} exceeded the expected duration of {}.",
                speech_type, expected
            ),
            TimingStatus::WithinRange => format!(
                "Great job keeping your {} within the expected duration of {}.",
                speech_type, expected
            ),
        };
        debug!(
            "Timing: actual {:.1}s against [{:.0}, {:.0}]s -> {} ({:.1})",
            actual_s, range.min_s, range.max_s, status.label(), score
        );

        Ok(AnalyzerResult::ok("timing", score)
            .with_metric("status", status.label())
            .with_metric("actual_minutes", round1(actual_s / 60.0))
            .with_metric("min_expected_minutes", range.min_s / 60.0)
            .with_metric("max_expected_minutes", range.max_s / 60.0)
            .with_metric("percentage_deviation", round1(percentage_deviation))
            .with_feedback(message))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzers::AnalyzerStatus;
    use crate::core::evaluation::test_support::ArtifactsBuilder;
    use test_case::test_case;

    #[test_case("5-7 minutes", 300.0, 420.0; "plain range")]
    #[test_case("5\u{2013}7 minutes", 300.0, 420.0; "en dash range")]
    #[test_case("5 minutes", 300.0, 300.0; "single value")]
    #[test_case("2-3 min", 120.0, 180.0; "short unit")]
    fn test_duration_parse(raw: &str, min_s: f64, max_s: f64) {
        let range = DurationRange::parse(raw).unwrap();
        assert_eq!(range.min_s, min_s);
        assert_eq!(range.max_s, max_s);
    }

    #[test]
    fn test_duration_parse_rejects_garbage() {
        for bad in ["soon", "", "seven-five minutes", "0 minutes"] {
            assert!(DurationRange::parse(bad).is_err(), "'{}' accepted", bad);
        }
    }

    #[test]
    fn test_within_range_at_center_scores_90() {
        let range = DurationRange::parse("5-7 minutes").unwrap();
        let (status, score) = score_duration(360.0, &range);
        assert_eq!(status, TimingStatus::WithinRange);
        assert!((score - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tolerance_boundaries() {
        let range = DurationRange::parse("5-7 minutes").unwrap();
        // 10% under the minimum is still tolerated.
        let (status, score) = score_duration(271.0, &range);
        assert_eq!(status, TimingStatus::WithinRange);
        assert!(score >= 80.0);
        // Below the tolerance it flips to too_short with a sub-80 band.
        let (status, score) = score_duration(200.0, &range);
        assert_eq!(status, TimingStatus::TooShort);
        assert!((50.0..=80.0).contains(&score));
        // And far past the maximum it bottoms out at 50.
        let (status, score) = score_duration(2000.0, &range);
        assert_eq!(status, TimingStatus::TooLong);
        assert_eq!(score, 50.0);
    }

    #[tokio::test]
    async fn test_analyze_within_range_scenario() {
        let artifacts = ArtifactsBuilder::new()
            .audio_duration(360.0)
            .expected_duration("5-7 minutes")
            .actual_duration_s(360.0)
            .speech_type("Prepared Speech")
            .build();
        let result = TimingAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Ok);
        assert!((90.0..=100.0).contains(&result.score));
        assert_eq!(
            result.metrics["status"],
            crate::core::analyzers::MetricValue::Text("within_range".to_string())
        );
    }

    #[tokio::test]
    async fn test_analyze_degrades_without_duration() {
        let artifacts = ArtifactsBuilder::new()
            .audio_duration(0.0)
            .expected_duration("5-7 minutes")
            .build();
        let result = TimingAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Degraded);
    }
}

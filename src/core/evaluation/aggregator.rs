//! Weighted aggregation of analyzer results into the final report.

use crate::core::analyzers::{AnalyzerResult, AnalyzerStatus};
use crate::core::transcript::AnnotatedTranscript;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Speaking-rate band considered comfortable, in words per second.
const RATE_COMFORT_BAND: (f64, f64) = (2.5, 4.2);
/// Maximum number of suggestions in a report.
const SUGGESTION_CAP: usize = 5;

/// Rating label for a 0-100 score.
pub fn rating_label(score: f64) -> &'static str {
    if score >= 90.0 {
        "Outstanding"
    } else if score >= 80.0 {
        "Excellent"
    } else if score >= 70.0 {
        "Very Good"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 50.0 {
        "Fair"
    } else if score >= 40.0 {
        "Needs Improvement"
    } else {
        "Significant Improvement Needed"
    }
}

/// Combines analyzer sub-scores under the configured weight vector.
pub struct Aggregator {
    weights: HashMap<String, f32>,
}

impl Aggregator {
    /// Create an aggregator over the configured weights. The weights are
    /// validated at configuration load; unknown analyzer results carry no
    /// weight and are ignored in the combination.
    pub fn new(weights: HashMap<String, f32>) -> Self {
        Self { weights }
    }

    /// Effective weights after removing non-contributing analyzers and
    /// rescaling the remainder to sum to 1.0.
    pub fn effective_weights(&self, results: &[AnalyzerResult]) -> HashMap<String, f64> {
        let mut effective: HashMap<String, f64> = HashMap::new();
        for result in results {
            if !result.status.contributes() {
                continue;
            }
            if let Some(&weight) = self.weights.get(&result.analyzer_id) {
                effective.insert(result.analyzer_id.clone(), weight as f64);
            }
        }
        let total: f64 = effective.values().sum();
        if total > 0.0 {
            for weight in effective.values_mut() {
                *weight /= total;
            }
        }
        effective
    }

    /// Weighted final score over the contributing analyzers.
    ///
    /// With nothing contributing the conservative default applies; the
    /// report is still produced.
    pub fn final_score(&self, results: &[AnalyzerResult]) -> f64 {
        let effective = self.effective_weights(results);
        if effective.is_empty() {
            return crate::core::analyzers::DEFAULT_SCORE;
        }
        let score: f64 = results
            .iter()
            .filter_map(|r| effective.get(&r.analyzer_id).map(|w| r.score * w))
            .sum();
        debug!(
            "Aggregated {} contributing analyzers into final score {:.2}",
            effective.len(),
            score
        );
        score.clamp(0.0, 100.0)
    }

    /// Integer component scores for the response envelope.
    pub fn component_scores(&self, results: &[AnalyzerResult]) -> BTreeMap<String, i64> {
        results
            .iter()
            .map(|r| (r.analyzer_id.clone(), r.score.round() as i64))
            .collect()
    }

    /// Prioritized improvement suggestions.
    ///
    /// The three weakest sub-60 analyzers contribute their top feedback
    /// line, then pace and pause-budget hints are appended, duplicates
    /// removed in order, capped at [`SUGGESTION_CAP`].
    pub fn suggestions(
        &self,
        results: &[AnalyzerResult],
        transcript: &AnnotatedTranscript,
        audio_duration_s: f64,
    ) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();

        let mut ranked: Vec<&AnalyzerResult> = results
            .iter()
            .filter(|r| r.status.contributes())
            .collect();
        ranked.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.analyzer_id.cmp(&b.analyzer_id))
        });
        for result in ranked.iter().take(3) {
            if result.score < 60.0 {
                if let Some(line) = result.feedback.first() {
                    suggestions.push(line.clone());
                }
            }
        }

        let rate = transcript.speaking_rate;
        if transcript.word_count > 0 {
            if rate > RATE_COMFORT_BAND.1 {
                suggestions.push(
                    "Consider slowing down your speaking rate to improve clarity and audience comprehension."
                        .to_string(),
                );
            } else if rate < RATE_COMFORT_BAND.0 {
                suggestions.push(
                    "Try increasing your speaking pace slightly to maintain audience engagement."
                        .to_string(),
                );
            }
        }

        if audio_duration_s > 0.0 {
            let pause_share = transcript.total_pause_time / audio_duration_s;
            if pause_share > 0.3 {
                suggestions.push(
                    "Reduce excessive pausing to maintain flow and audience engagement."
                        .to_string(),
                );
            } else if pause_share < 0.05 && transcript.word_count > 0 {
                suggestions.push(
                    "Incorporate more strategic pauses to emphasize key points and give listeners time to process."
                        .to_string(),
                );
            }
        }

        let mut seen = std::collections::HashSet::new();
        suggestions.retain(|s| seen.insert(s.clone()));
        suggestions.truncate(SUGGESTION_CAP);
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_weights;
    use crate::core::analyzers::AnalyzerResult;
    use crate::core::transcript::{TranscriptBuilder, TranscriptionResult};

    fn results_with_scores(scores: &[(&str, f64)]) -> Vec<AnalyzerResult> {
        scores
            .iter()
            .map(|(id, score)| AnalyzerResult::ok(id, *score))
            .collect()
    }

    fn all_ids_at(score: f64) -> Vec<AnalyzerResult> {
        results_with_scores(&[
            ("effectiveness", score),
            ("structure", score),
            ("content", score),
            ("pronunciation", score),
            ("prosody", score),
            ("disfluency", score),
            ("timing", score),
        ])
    }

    fn empty_transcript() -> AnnotatedTranscript {
        TranscriptBuilder::new().build(&TranscriptionResult::default(), 60.0)
    }

    #[test]
    fn test_uniform_scores_reproduce_score() {
        let aggregator = Aggregator::new(default_weights());
        let results = all_ids_at(73.0);
        assert!((aggregator.final_score(&results) - 73.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_weights_sum_to_one() {
        let aggregator = Aggregator::new(default_weights());
        let results = all_ids_at(80.0);
        let total: f64 = aggregator.effective_weights(&results).values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_redistribution_on_skip() {
        let aggregator = Aggregator::new(default_weights());
        let mut results = all_ids_at(80.0);
        results[0] = AnalyzerResult::skipped("effectiveness", "topic missing");

        let effective = aggregator.effective_weights(&results);
        assert!(!effective.contains_key("effectiveness"));
        let total: f64 = effective.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
        // Remaining analyzers all scored 80, so the final stays 80.
        assert!((aggregator.final_score(&results) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_analyzer_redistributed() {
        let aggregator = Aggregator::new(default_weights());
        let mut results = all_ids_at(90.0);
        results[3] = AnalyzerResult::failed("pronunciation", "timed out");
        let score = aggregator.final_score(&results);
        // The failed default score of 50 must not drag the average down.
        assert!((score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_degraded_still_contributes() {
        let aggregator = Aggregator::new(default_weights());
        let mut results = all_ids_at(90.0);
        results[1] = AnalyzerResult::degraded("structure", 50.0, "empty");
        let score = aggregator.final_score(&results);
        assert!(score < 90.0);
    }

    #[test]
    fn test_nothing_contributes_yields_default() {
        let aggregator = Aggregator::new(default_weights());
        let results = vec![
            AnalyzerResult::failed("structure", "boom"),
            AnalyzerResult::skipped("timing", "missing"),
        ];
        assert_eq!(
            aggregator.final_score(&results),
            crate::core::analyzers::DEFAULT_SCORE
        );
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(rating_label(95.0), "Outstanding");
        assert_eq!(rating_label(85.0), "Excellent");
        assert_eq!(rating_label(75.0), "Very Good");
        assert_eq!(rating_label(65.0), "Good");
        assert_eq!(rating_label(55.0), "Fair");
        assert_eq!(rating_label(45.0), "Needs Improvement");
        assert_eq!(rating_label(10.0), "Significant Improvement Needed");
    }

    #[test]
    fn test_suggestions_from_weakest_analyzers() {
        let aggregator = Aggregator::new(default_weights());
        let mut results = all_ids_at(85.0);
        results[5] = AnalyzerResult::ok("disfluency", 20.0)
            .with_feedback("Work on reducing filler words.");
        results[1] =
            AnalyzerResult::ok("structure", 40.0).with_feedback("Add a clear introduction.");

        let suggestions = aggregator.suggestions(&results, &empty_transcript(), 0.0);
        assert!(suggestions.contains(&"Work on reducing filler words.".to_string()));
        assert!(suggestions.contains(&"Add a clear introduction.".to_string()));
        assert!(suggestions.len() <= 5);
    }

    #[test]
    fn test_suggestions_deduplicated_and_capped() {
        let aggregator = Aggregator::new(default_weights());
        let mut results = Vec::new();
        for id in ["structure", "content", "disfluency"] {
            results.push(AnalyzerResult::ok(id, 30.0).with_feedback("Practice more."));
        }
        let suggestions = aggregator.suggestions(&results, &empty_transcript(), 0.0);
        assert_eq!(
            suggestions
                .iter()
                .filter(|s| s.as_str() == "Practice more.")
                .count(),
            1
        );
    }

    #[test]
    fn test_pace_hint_for_fast_speech() {
        use crate::core::evaluation::test_support::transcription_from_words;
        let aggregator = Aggregator::new(default_weights());
        // 50 words crammed into 10 seconds is 5 w/s.
        let words: Vec<(&str, f64, f64)> = (0..50)
            .map(|i| ("go", i as f64 * 0.2, i as f64 * 0.2 + 0.15))
            .collect();
        let transcript =
            TranscriptBuilder::new().build(&transcription_from_words(&words), 10.0);
        let suggestions = aggregator.suggestions(&all_ids_at(90.0), &transcript, 10.0);
        assert!(suggestions.iter().any(|s| s.contains("slowing down")));
    }
}

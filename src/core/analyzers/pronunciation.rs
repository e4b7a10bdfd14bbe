//! Pronunciation analyzer: phoneme-category clarity estimates, prosodic
//! control, fluency, and articulation.
//!
//! All four sub-scores are constructed on the [60, 95] band before the
//! weighted combination. When the pronouncing dictionary or the audio
//! features are unavailable the analyzer falls back to recognizer
//! confidence; with neither source it degrades instead of fabricating
//! values.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::config::PronunciationWeightsConfig;
use crate::core::evaluation::Artifacts;
use crate::core::nlp::phoneme::PhonemeCategory;
use crate::core::nlp::tokenize_words;
use crate::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;

/// Sub-score construction band.
const SCORE_FLOOR: f64 = 60.0;
const SCORE_CEIL: f64 = 95.0;
/// Final scoring scale.
const FINAL_FLOOR: f64 = 50.0;
const FINAL_CEIL: f64 = 95.0;

fn banded(value: f64) -> f64 {
    value.clamp(SCORE_FLOOR, SCORE_CEIL)
}

fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean.abs() < 1e-12 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean
}

/// Acoustic contours the sub-scores read; detached from the loader so the
/// scoring functions stay pure and testable.
pub struct AcousticSummary {
    pub intensity_db: Vec<f32>,
    pub zcr: Vec<f32>,
    pub centroid: Vec<f32>,
    pub pitch: Vec<f32>,
    pub mfcc: Vec<Vec<f32>>,
    pub onset_strength: Vec<f32>,
    pub onset_times: Vec<f64>,
}

impl AcousticSummary {
    /// Linear energy derived from the dB-like intensity contour.
    fn linear_energy(&self) -> Vec<f64> {
        self.intensity_db
            .iter()
            .map(|&db| 10f64.powf((db as f64 - 96.0) / 20.0))
            .collect()
    }

    /// Spread of the per-coefficient MFCC means; timbral variety that
    /// distinguishes crisp articulation from mumbling.
    fn mfcc_variability(&self) -> f64 {
        if self.mfcc.is_empty() {
            return 0.0;
        }
        let coeffs = self.mfcc[0].len();
        let mut means = Vec::with_capacity(coeffs);
        for c in 0..coeffs {
            let sum: f64 = self.mfcc.iter().map(|frame| frame[c] as f64).sum();
            means.push(sum / self.mfcc.len() as f64);
        }
        let grand = means.iter().sum::<f64>() / means.len() as f64;
        let variance =
            means.iter().map(|m| (m - grand).powi(2)).sum::<f64>() / means.len() as f64;
        variance.sqrt()
    }
}

/// Per-category clarity estimates from acoustic proxies.
pub fn phoneme_category_scores(
    categories: &HashMap<PhonemeCategory, usize>,
    acoustics: &AcousticSummary,
) -> HashMap<PhonemeCategory, f64> {
    let zcr_mean = mean(&acoustics.zcr);
    let intensity_median = {
        let mut sorted: Vec<f32> = acoustics.intensity_db.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted.get(sorted.len() / 2).copied().unwrap_or(0.0)
    };

    // Vowel clarity: share of energetic frames that are also low-ZCR,
    // i.e. voiced resonance rather than noise.
    let frames = acoustics.intensity_db.len().min(acoustics.zcr.len());
    let mut energetic = 0usize;
    let mut voiced_energetic = 0usize;
    for i in 0..frames {
        if acoustics.intensity_db[i] > intensity_median {
            energetic += 1;
            if acoustics.zcr[i] < 0.15 {
                voiced_energetic += 1;
            }
        }
    }
    let vowel_ratio = if energetic > 0 {
        voiced_energetic as f64 / energetic as f64
    } else {
        0.0
    };

    // Fricative clarity: sustained high-frequency noise content.
    let fricative_ratio = (zcr_mean / 0.12).min(1.0);

    // Stop clarity: transient prominence of the onset envelope.
    let onset_values: Vec<f64> = acoustics.onset_strength.iter().map(|&v| v as f64).collect();
    let stop_ratio = (coefficient_of_variation(&onset_values) / 2.0).min(1.0);

    let mut scores = HashMap::new();
    for category in categories.keys() {
        let score = match category {
            PhonemeCategory::Vowels => SCORE_FLOOR + 35.0 * vowel_ratio,
            PhonemeCategory::Fricatives | PhonemeCategory::Affricates => {
                SCORE_FLOOR + 35.0 * fricative_ratio
            }
            PhonemeCategory::Stops => SCORE_FLOOR + 35.0 * stop_ratio,
            _ => 80.0,
        };
        scores.insert(*category, banded(score));
    }
    scores
}

/// Weighted phoneme-accuracy score over the category estimates.
pub fn phoneme_accuracy(
    categories: &HashMap<PhonemeCategory, usize>,
    scores: &HashMap<PhonemeCategory, f64>,
) -> f64 {
    let total: usize = categories.values().sum();
    if total == 0 || scores.is_empty() {
        return 80.0;
    }
    let weighted: f64 = scores
        .iter()
        .map(|(category, score)| score * categories[category] as f64 / total as f64)
        .sum();
    banded(weighted)
}

/// Intonation, rhythm, and stress sub-score.
pub fn prosody_control(acoustics: &AcousticSummary) -> f64 {
    let voiced: Vec<f64> = acoustics
        .pitch
        .iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| v as f64)
        .collect();
    let intonation = {
        let cv = coefficient_of_variation(&voiced);
        let score = if (0.05..=0.25).contains(&cv) {
            85.0 + cv * 40.0
        } else if cv < 0.05 {
            60.0 + cv * 500.0
        } else {
            95.0 - (cv - 0.25) * 100.0
        };
        banded(score)
    };

    let rhythm = {
        if acoustics.onset_times.len() < 3 {
            80.0
        } else {
            let intervals: Vec<f64> = acoustics
                .onset_times
                .windows(2)
                .map(|pair| pair[1] - pair[0])
                .collect();
            let cv = coefficient_of_variation(&intervals);
            let score = if cv < 0.6 {
                85.0 - cv * 25.0
            } else {
                70.0 - (cv - 0.6) * 30.0
            };
            banded(score)
        }
    };

    let stress = {
        let energy = acoustics.linear_energy();
        let cv = coefficient_of_variation(&energy);
        let score = if (0.4..=0.8).contains(&cv) {
            80.0 + cv * 20.0
        } else if cv < 0.4 {
            60.0 + cv * 50.0
        } else {
            96.0 - (cv - 0.8) * 40.0
        };
        banded(score)
    };

    intonation * 0.4 + rhythm * 0.3 + stress * 0.3
}

/// Word-timing based fluency sub-score.
pub fn fluency(word_timings: &[(f64, f64)]) -> f64 {
    if word_timings.len() < 2 {
        return 80.0;
    }
    let span = word_timings.last().unwrap().1 - word_timings.first().unwrap().0;

    let mut pauses = Vec::new();
    let mut hesitations = 0usize;
    for pair in word_timings.windows(2) {
        let gap = pair[1].0 - pair[0].1;
        if gap > 0.25 {
            pauses.push(gap);
            if gap > 0.75 {
                hesitations += 1;
            }
        }
    }

    let pause_quality = if pauses.is_empty() || span <= 0.0 {
        80.0
    } else {
        let ratio = pauses.iter().sum::<f64>() / span;
        let mut score = if (0.1..=0.25).contains(&ratio) {
            90.0 - (ratio - 0.15) * 100.0
        } else if ratio < 0.1 {
            70.0 + ratio * 200.0
        } else {
            90.0 - (ratio - 0.25) * 120.0
        };
        if pauses.len() > 2 {
            let cv = coefficient_of_variation(&pauses);
            if cv < 0.5 {
                score += 5.0;
            } else if cv > 1.0 {
                score -= 5.0;
            }
        }
        banded(score)
    };

    let hesitation_ratio = hesitations as f64 / (word_timings.len() as f64 / 10.0);
    let hesitation_score = banded(if hesitation_ratio <= 0.1 {
        90.0
    } else if hesitation_ratio <= 0.3 {
        80.0 - (hesitation_ratio - 0.1) * 50.0
    } else {
        70.0 - (hesitation_ratio - 0.3) * 30.0
    });

    let durations: Vec<f64> = word_timings.iter().map(|(start, end)| end - start).collect();
    let duration_cv = coefficient_of_variation(&durations);
    let flow = banded(if duration_cv < 0.5 {
        90.0 - duration_cv * 20.0
    } else if duration_cv < 0.8 {
        80.0 - (duration_cv - 0.5) * 30.0
    } else {
        70.0 - (duration_cv - 0.8) * 25.0
    });

    pause_quality * 0.3 + hesitation_score * 0.4 + flow * 0.3
}

/// Spectral articulation sub-score.
pub fn articulation(acoustics: &AcousticSummary) -> f64 {
    let centroid_mean = mean(&acoustics.centroid);
    let clarity_factor = centroid_mean / 2000.0;
    let clarity = banded(if (0.8..=1.2).contains(&clarity_factor) {
        90.0
    } else if clarity_factor < 0.8 {
        75.0 + clarity_factor * 10.0
    } else {
        85.0 - (clarity_factor - 1.2) * 25.0
    });

    let zcr_values: Vec<f64> = acoustics.zcr.iter().map(|&v| v as f64).collect();
    let zcr_cv = coefficient_of_variation(&zcr_values);
    let energy = acoustics.linear_energy();
    let transitions: Vec<f64> = energy.windows(2).map(|p| (p[1] - p[0]).abs()).collect();
    let transition_mean = if transitions.is_empty() {
        0.0
    } else {
        transitions.iter().sum::<f64>() / transitions.len() as f64
    };
    let mut precision = if zcr_cv > 0.5 && transition_mean > 1e-4 {
        85.0 + zcr_cv * 10.0
    } else {
        75.0 + zcr_cv * 10.0
    };
    precision += (acoustics.mfcc_variability() / 10.0).min(5.0);
    let precision = banded(precision);

    (clarity + precision) / 2.0
}

/// Pronunciation quality analyzer.
pub struct PronunciationAnalyzer;

#[async_trait]
impl Analyzer for PronunciationAnalyzer {
    fn id(&self) -> &'static str {
        "pronunciation"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript, Feature::Audio, Feature::Mfcc, Feature::Onsets]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        if artifacts.transcript.word_count == 0 {
            return Ok(AnalyzerResult::degraded(
                "pronunciation",
                super::DEFAULT_SCORE,
                "empty transcript",
            )
            .with_feedback("No words were recognized, so pronunciation could not be assessed."));
        }

        let weights = artifacts
            .config
            .domain_profile(&artifacts.metadata.domain)
            .pronunciation_weights
            .unwrap_or_default();

        let acoustics = self.load_acoustics(artifacts).await;
        match acoustics {
            Some(acoustics) => self.analyze_acoustic(artifacts, &weights, &acoustics),
            None => self.analyze_from_confidence(artifacts, &weights),
        }
    }
}

impl PronunciationAnalyzer {
    async fn load_acoustics(&self, artifacts: &Artifacts) -> Option<AcousticSummary> {
        let intensity = artifacts.features.intensity().await.ok()?;
        let spectral = artifacts.features.spectral().await.ok()?;
        let pitch = artifacts.features.pitch().await.ok()?;
        let mfcc = artifacts.features.mfcc().await.ok()?;
        let onsets = artifacts.features.onsets().await.ok()?;
        let onset_times = onsets
            .onsets
            .iter()
            .map(|&frame| crate::services::features::FeatureLoader::frame_to_time(frame))
            .collect();
        Some(AcousticSummary {
            intensity_db: intensity.values.clone(),
            zcr: spectral.zcr.clone(),
            centroid: spectral.centroid.clone(),
            pitch: pitch.values.clone(),
            mfcc: mfcc.frames.clone(),
            onset_strength: onsets.strength.clone(),
            onset_times,
        })
    }

    fn analyze_acoustic(
        &self,
        artifacts: &Artifacts,
        weights: &PronunciationWeightsConfig,
        acoustics: &AcousticSummary,
    ) -> Result<AnalyzerResult> {
        let plain = artifacts.transcript.plain_text();
        let words = tokenize_words(&plain);

        // Phoneme accuracy from the dictionary, or recognizer confidence
        // when no dictionary is loaded.
        let (phoneme_score, phoneme_source, difficult) = match artifacts.reference.phonemes() {
            Some(dict) => {
                let categories = dict.category_counts(&words);
                if categories.is_empty() {
                    (confidence_score(artifacts), "confidence", Vec::new())
                } else {
                    let scores = phoneme_category_scores(&categories, acoustics);
                    let mut difficult: Vec<String> = scores
                        .iter()
                        .filter(|&(_, &score)| score < 75.0)
                        .map(|(category, _)| category.label().to_string())
                        .collect();
                    difficult.sort();
                    (
                        Some(phoneme_accuracy(&categories, &scores)),
                        "dictionary",
                        difficult,
                    )
                }
            }
            None => (confidence_score(artifacts), "confidence", Vec::new()),
        };
        let Some(phoneme_score) = phoneme_score else {
            return Ok(AnalyzerResult::degraded(
                "pronunciation",
                super::DEFAULT_SCORE,
                "no pronouncing dictionary and no recognizer confidence available",
            )
            .with_feedback(
                "Pronunciation detail could not be estimated for this recording.",
            ));
        };

        let prosody_score = prosody_control(acoustics);
        let word_timings: Vec<(f64, f64)> = artifacts
            .transcription
            .words()
            .map(|w| (w.start, w.end))
            .collect();
        let fluency_score = fluency(&word_timings);
        let articulation_score = articulation(acoustics);

        let mut overall = phoneme_score * weights.phoneme_accuracy as f64
            + prosody_score * weights.prosody as f64
            + fluency_score * weights.fluency as f64
            + articulation_score * weights.articulation as f64;

        // Difficulty adjustment: long-word share nudges the total.
        let advanced = words.iter().filter(|w| w.len() > 8).count();
        let complexity_factor =
            (1.0 + advanced as f64 / words.len().max(1) as f64 * 0.2).clamp(0.9, 1.1);
        overall *= complexity_factor;

        // Accent adjustment: a bounded boost keeps non-native phoneme
        // estimates from dominating the total.
        if phoneme_score < 75.0 {
            let boost = ((75.0 - phoneme_score) * 0.5).min(15.0);
            overall += boost * weights.phoneme_accuracy as f64;
        }
        let overall = overall.clamp(FINAL_FLOOR, FINAL_CEIL);

        debug!(
            "Pronunciation: phoneme {:.1} ({}), prosody {:.1}, fluency {:.1}, articulation {:.1} -> {:.1}",
            phoneme_score, phoneme_source, prosody_score, fluency_score, articulation_score, overall
        );

        let mut result = if phoneme_source == "confidence" {
            AnalyzerResult::degraded(
                "pronunciation",
                overall,
                "phoneme estimates fell back to recognizer confidence",
            )
        } else {
            AnalyzerResult::ok("pronunciation", overall)
        };
        result = result
            .with_metric("phoneme_accuracy", round1(phoneme_score))
            .with_metric("phoneme_source", phoneme_source)
            .with_metric("prosody_score", round1(prosody_score))
            .with_metric("fluency_score", round1(fluency_score))
            .with_metric("articulation_score", round1(articulation_score))
            .with_feedback_lines(score_feedback(overall, &difficult));
        if !difficult.is_empty() {
            result = result.with_metric("difficult_phoneme_categories", difficult);
        }
        Ok(result)
    }

    fn analyze_from_confidence(
        &self,
        artifacts: &Artifacts,
        weights: &PronunciationWeightsConfig,
    ) -> Result<AnalyzerResult> {
        let Some(phoneme_score) = confidence_score(artifacts) else {
            return Ok(AnalyzerResult::degraded(
                "pronunciation",
                super::DEFAULT_SCORE,
                "audio features and recognizer confidence both unavailable",
            )
            .with_feedback(
                "Pronunciation detail could not be estimated for this recording.",
            ));
        };

        // Rhythm from word durations is the only acoustic-free signal.
        let word_timings: Vec<(f64, f64)> = artifacts
            .transcription
            .words()
            .map(|w| (w.start, w.end))
            .collect();
        let fluency_score = fluency(&word_timings);
        let prosody_score = 80.0;
        let articulation_score = 80.0;

        let overall = (phoneme_score * weights.phoneme_accuracy as f64
            + prosody_score * weights.prosody as f64
            + fluency_score * weights.fluency as f64
            + articulation_score * weights.articulation as f64)
            .clamp(FINAL_FLOOR, FINAL_CEIL);

        Ok(AnalyzerResult::degraded(
            "pronunciation",
            overall,
            "audio features unavailable, scored from recognizer confidence",
        )
        .with_metric("phoneme_accuracy", round1(phoneme_score))
        .with_metric("phoneme_source", "confidence")
        .with_metric("fluency_score", round1(fluency_score))
        .with_feedback_lines(score_feedback(overall, &[])))
    }
}

/// Phoneme-accuracy stand-in from recognizer confidence, if reported.
fn confidence_score(artifacts: &Artifacts) -> Option<f64> {
    artifacts
        .transcription
        .mean_confidence()
        .map(|confidence| banded(65.0 + confidence as f64 * 30.0))
}

fn score_feedback(overall: f64, difficult: &[String]) -> Vec<String> {
    let mut feedback = Vec::new();
    if overall >= 85.0 {
        feedback.push("Excellent pronunciation clarity and articulation.".to_string());
    } else if overall >= 70.0 {
        feedback.push("Good pronunciation with minor areas for improvement.".to_string());
    } else if overall >= 55.0 {
        feedback.push("Fair pronunciation. Focus on clearer articulation of sounds.".to_string());
    } else {
        feedback.push(
            "Pronunciation needs significant improvement. Consider speech exercises."
                .to_string(),
        );
    }
    if !difficult.is_empty() {
        feedback.push(format!(
            "Focus on improving these sound groups: {}.",
            difficult.join(", ")
        ));
    }
    feedback
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzers::AnalyzerStatus;
    use crate::core::evaluation::test_support::{transcription_from_words, ArtifactsBuilder};
    use crate::core::transcript::{Segment, TranscriptionResult, WordToken};

    fn flat_acoustics() -> AcousticSummary {
        AcousticSummary {
            intensity_db: vec![60.0; 100],
            zcr: vec![0.08; 100],
            centroid: vec![1900.0; 100],
            pitch: vec![120.0; 100],
            mfcc: vec![vec![1.0; 13]; 100],
            onset_strength: vec![0.5; 100],
            onset_times: (0..20).map(|i| i as f64 * 0.3).collect(),
        }
    }

    #[test]
    fn test_phoneme_scores_stay_banded() {
        let mut categories = HashMap::new();
        categories.insert(PhonemeCategory::Vowels, 10);
        categories.insert(PhonemeCategory::Fricatives, 5);
        categories.insert(PhonemeCategory::Stops, 5);
        categories.insert(PhonemeCategory::Nasals, 3);
        let scores = phoneme_category_scores(&categories, &flat_acoustics());
        for score in scores.values() {
            assert!((SCORE_FLOOR..=SCORE_CEIL).contains(score));
        }
        let overall = phoneme_accuracy(&categories, &scores);
        assert!((SCORE_FLOOR..=SCORE_CEIL).contains(&overall));
    }

    #[test]
    fn test_prosody_control_banded() {
        let score = prosody_control(&flat_acoustics());
        assert!((SCORE_FLOOR..=SCORE_CEIL).contains(&score));
    }

    #[test]
    fn test_fluency_prefers_smooth_timing() {
        let smooth: Vec<(f64, f64)> = (0..40)
            .map(|i| (i as f64 * 0.4, i as f64 * 0.4 + 0.3))
            .collect();
        let mut choppy = smooth.clone();
        for (i, timing) in choppy.iter_mut().enumerate() {
            if i % 4 == 0 {
                timing.1 = timing.0 + 0.05;
            }
        }
        // Insert long hesitations into the choppy version.
        for i in (8..40).step_by(8) {
            choppy[i].0 += 1.2;
            choppy[i].1 += 1.2;
        }
        assert!(fluency(&smooth) >= fluency(&choppy));
    }

    #[test]
    fn test_articulation_banded() {
        let score = articulation(&flat_acoustics());
        assert!((SCORE_FLOOR..=SCORE_CEIL).contains(&score));
    }

    #[tokio::test]
    async fn test_confidence_fallback_is_degraded() {
        let words: Vec<WordToken> = (0..10)
            .map(|i| WordToken {
                word: "steady".to_string(),
                start: i as f64 * 0.5,
                end: i as f64 * 0.5 + 0.4,
                confidence: Some(0.9),
            })
            .collect();
        let transcription = TranscriptionResult {
            segments: vec![Segment {
                start: 0.0,
                end: 5.0,
                text: "steady".repeat(10),
                words,
                confidence: Some(0.9),
            }],
        };
        // The fixture audio path does not exist, so feature loading fails
        // and the analyzer takes the confidence path.
        let artifacts = ArtifactsBuilder::new()
            .audio_path("missing-audio.wav")
            .transcription(transcription)
            .build();
        let result = PronunciationAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Degraded);
        assert!((FINAL_FLOOR..=FINAL_CEIL).contains(&result.score));
    }

    #[tokio::test]
    async fn test_no_confidence_no_audio_degrades_with_default() {
        let artifacts = ArtifactsBuilder::new()
            .audio_path("missing-audio.wav")
            .transcription(transcription_from_words(&[
                ("hello", 0.0, 0.4),
                ("there", 0.5, 0.9),
            ]))
            .build();
        let result = PronunciationAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Degraded);
        assert_eq!(result.score, crate::core::analyzers::DEFAULT_SCORE);
    }

    #[tokio::test]
    async fn test_empty_transcript_degrades() {
        let artifacts = ArtifactsBuilder::new()
            .transcription(TranscriptionResult::default())
            .build();
        let result = PronunciationAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Degraded);
    }
}

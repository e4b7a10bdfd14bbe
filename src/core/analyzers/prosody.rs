//! Prosody analyzer: pitch range against the gender-dependent ideal band,
//! volume consistency, and emphasis placement.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::{Artifacts, GenderHint};
use crate::core::nlp::embedding::extract_keywords;
use crate::core::transcript::Token;
use crate::services::features::pitch::{median_filter, percentile, voiced};
use crate::services::features::FeatureLoader;
use crate::Result;
use async_trait::async_trait;
use log::debug;

/// Ideal pitch band for male voices (Hz).
pub const MALE_PITCH_BAND: (f32, f32) = (85.0, 180.0);
/// Ideal pitch band for female voices (Hz).
pub const FEMALE_PITCH_BAND: (f32, f32) = (165.0, 255.0);

/// Emphasis-score threshold over the normalized prominence contour.
const EMPHASIS_THRESHOLD: f32 = 0.7;
/// Regions closer than this many frames merge into one.
const EMPHASIS_MERGE_GAP: usize = 3;

/// Detected speaker gender for band selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedGender {
    Male,
    Female,
}

impl DetectedGender {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn band(&self) -> (f32, f32) {
        match self {
            Self::Male => MALE_PITCH_BAND,
            Self::Female => FEMALE_PITCH_BAND,
        }
    }
}

/// Estimate gender from pitch statistics.
///
/// Both directions accumulate symmetric evidence from the median and the
/// distribution tails. `tie_break` shifts the decision margin: zero is
/// neutral, positive values lean borderline cases male (ties themselves
/// resolve male so a borderline voice does not flip between runs).
pub fn detect_gender(pitch_values: &[f32], tie_break: f32) -> DetectedGender {
    let voiced_values = voiced(pitch_values);
    if voiced_values.is_empty() {
        return DetectedGender::Male;
    }
    let filtered = median_filter(&voiced_values, 5);

    let median = percentile(&filtered, 50.0);
    let q10 = percentile(&filtered, 10.0);
    let q25 = percentile(&filtered, 25.0);
    let q75 = percentile(&filtered, 75.0);
    let q90 = percentile(&filtered, 90.0);

    let mut male_score = 0.0f32;
    let mut female_score = 0.0f32;

    if median < 140.0 {
        male_score += 15.0;
    } else if median > 200.0 {
        female_score += 15.0;
    } else if median < 165.0 {
        male_score += 10.0;
    } else {
        female_score += 10.0;
    }

    if q75 < 165.0 {
        male_score += 5.0;
    }
    if q25 > 165.0 {
        female_score += 5.0;
    }
    if q10 < 110.0 {
        male_score += 5.0;
    }
    if q90 > 220.0 {
        female_score += 5.0;
    }

    // tie_break is configured in [-1, 1] and scaled onto the evidence
    // range; ties themselves resolve male.
    if female_score > male_score + tie_break * 20.0 {
        DetectedGender::Female
    } else {
        DetectedGender::Male
    }
}

/// Frame counts per band classification.
#[derive(Debug, Default, Clone, Copy)]
pub struct BandOccupancy {
    pub optimal: usize,
    pub too_low: usize,
    pub too_high: usize,
}

impl BandOccupancy {
    fn voiced_total(&self) -> usize {
        self.optimal + self.too_low + self.too_high
    }

    /// Share of voiced time spent inside the band, as a 0-100 score.
    pub fn score(&self) -> f64 {
        let total = self.voiced_total();
        if total == 0 {
            return 0.0;
        }
        (self.optimal as f64 / total as f64 * 100.0).round()
    }
}

/// Classify each voiced frame of the median-filtered contour against the
/// band.
pub fn classify_band(pitch_values: &[f32], band: (f32, f32)) -> BandOccupancy {
    let filtered = median_filter(pitch_values, 5);
    let mut occupancy = BandOccupancy::default();
    for &value in &filtered {
        if value <= 0.0 {
            continue;
        }
        if value < band.0 {
            occupancy.too_low += 1;
        } else if value > band.1 {
            occupancy.too_high += 1;
        } else {
            occupancy.optimal += 1;
        }
    }
    occupancy
}

/// Volume-consistency sub-score on the 0-10 scale.
pub fn volume_consistency(intensity: &[f32]) -> f64 {
    if intensity.is_empty() {
        return 5.0;
    }
    let mean = intensity.iter().sum::<f32>() / intensity.len() as f32;
    let variance =
        intensity.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / intensity.len() as f32;
    let std = variance.sqrt();
    let max = intensity.iter().cloned().fold(f32::MIN, f32::max);
    let min = intensity.iter().cloned().fold(f32::MAX, f32::min);
    let range = max - min;

    let mut score: f64 = 10.0;
    if std > 20.0 {
        score -= 2.0;
    }
    if range > 50.0 {
        score -= 2.0;
    }
    if (10.0..=18.0).contains(&std) {
        score += 1.0;
    }
    score.clamp(5.0, 10.0)
}

fn z_scores(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
    let std = variance.sqrt().max(1e-6);
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Detect emphasis regions over index-aligned contours.
///
/// Prominence per frame blends normalized volume (40%), pitch change
/// (30%), spectral flux (20%), and pause proximity (10%); frames above
/// the threshold merge into regions when at most three frames apart.
pub fn detect_emphasis_regions(
    intensity: &[f32],
    pitch_values: &[f32],
    flux: &[f32],
    pause_proximity: &[f32],
) -> Vec<(usize, usize)> {
    let frames = intensity
        .len()
        .min(pitch_values.len())
        .min(flux.len())
        .min(pause_proximity.len());
    if frames == 0 {
        return Vec::new();
    }

    let volume_z = z_scores(&intensity[..frames]);
    let mut pitch_delta = vec![0.0f32; frames];
    for i in 1..frames {
        pitch_delta[i] = (pitch_values[i] - pitch_values[i - 1]).abs();
    }
    let pitch_z = z_scores(&pitch_delta);
    let flux_z = z_scores(&flux[..frames]);

    let mut combined: Vec<f32> = (0..frames)
        .map(|i| {
            0.4 * volume_z[i] + 0.3 * pitch_z[i] + 0.2 * flux_z[i] + 0.1 * pause_proximity[i]
        })
        .collect();

    let min = combined.iter().cloned().fold(f32::MAX, f32::min);
    let max = combined.iter().cloned().fold(f32::MIN, f32::max);
    let span = (max - min).max(1e-6);
    for value in &mut combined {
        *value = (*value - min) / span;
    }

    let mut regions: Vec<(usize, usize)> = Vec::new();
    for (i, &value) in combined.iter().enumerate() {
        if value <= EMPHASIS_THRESHOLD {
            continue;
        }
        match regions.last_mut() {
            Some((_, end)) if i <= *end + EMPHASIS_MERGE_GAP => *end = i,
            _ => regions.push((i, i)),
        }
    }
    regions
}

/// Pause-proximity indicator per frame: 1.0 shortly after an annotated
/// pause ends, 0.0 elsewhere.
pub fn pause_proximity_track(tokens: &[Token], frames: usize) -> Vec<f32> {
    let mut track = vec![0.0f32; frames];
    let mut previous_word_end = 0.0f64;
    for token in tokens {
        match token {
            Token::Word { end, .. } => previous_word_end = *end,
            Token::Pause { duration_s, .. } => {
                let pause_end = previous_word_end + duration_s;
                let window_end = pause_end + 0.5;
                for (frame, slot) in track.iter_mut().enumerate() {
                    let t = FeatureLoader::frame_to_time(frame);
                    if t >= pause_end && t <= window_end {
                        *slot = 1.0;
                    }
                }
            }
        }
    }
    track
}

/// Words whose alignment overlaps any emphasis region.
pub fn emphasized_words(
    artifacts: &Artifacts,
    regions: &[(usize, usize)],
) -> Vec<String> {
    let mut words = Vec::new();
    for &(start_frame, end_frame) in regions {
        let start_t = FeatureLoader::frame_to_time(start_frame);
        let end_t = FeatureLoader::frame_to_time(end_frame + 1);
        let mut phrase: Vec<&str> = Vec::new();
        for word in artifacts.transcription.words() {
            if word.start <= end_t && word.end >= start_t {
                phrase.push(&word.word);
            }
        }
        if !phrase.is_empty() {
            words.push(phrase.join(" "));
        }
    }
    words
}

/// Pitch and emphasis analyzer.
pub struct ProsodyAnalyzer;

#[async_trait]
impl Analyzer for ProsodyAnalyzer {
    fn id(&self) -> &'static str {
        "prosody"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Audio, Feature::Pitch, Feature::Intensity, Feature::Onsets]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let pitch = match artifacts.features.pitch().await {
            Ok(pitch) => pitch,
            Err(e) => {
                return Ok(AnalyzerResult::degraded(
                    "prosody",
                    super::DEFAULT_SCORE,
                    &format!("pitch contour unavailable: {}", e),
                )
                .with_feedback("Vocal variety could not be measured for this recording."));
            }
        };
        let voiced_values = voiced(&pitch.values);
        if voiced_values.is_empty() {
            return Ok(AnalyzerResult::degraded(
                "prosody",
                super::DEFAULT_SCORE,
                "no voiced frames detected",
            )
            .with_feedback("No voiced speech was detected in the recording."));
        }
        let intensity = artifacts.features.intensity().await?;
        let onsets = artifacts.features.onsets().await?;

        // Gender and band occupancy.
        let gender = match artifacts.metadata.gender_hint {
            GenderHint::Male => DetectedGender::Male,
            GenderHint::Female => DetectedGender::Female,
            GenderHint::Auto => {
                detect_gender(&pitch.values, artifacts.config.analysis.gender_tie_break)
            }
        };
        let band = gender.band();
        let occupancy = classify_band(&pitch.values, band);
        let pitch_score = occupancy.score();

        let frame_s = FeatureLoader::frame_to_time(1);
        let time_optimal = occupancy.optimal as f64 * frame_s;
        let time_too_low = occupancy.too_low as f64 * frame_s;
        let time_too_high = occupancy.too_high as f64 * frame_s;

        // Volume consistency.
        let volume_score = volume_consistency(&intensity.values);

        // Emphasis regions and coverage of key phrases.
        let proximity = pause_proximity_track(&artifacts.transcript.tokens, intensity.values.len());
        let regions = detect_emphasis_regions(
            &intensity.values,
            &pitch.values,
            &onsets.strength,
            &proximity,
        );
        let emphasized = emphasized_words(artifacts, &regions);

        let plain = artifacts.transcript.plain_text();
        let key_phrases = extract_keywords(
            &plain,
            10,
            artifacts.reference.frequencies(),
            artifacts.reference.stopwords(),
        );
        let covered = key_phrases
            .iter()
            .filter(|phrase| {
                emphasized
                    .iter()
                    .any(|words| words.to_lowercase().contains(phrase.as_str()))
            })
            .count();
        let coverage = if key_phrases.is_empty() {
            0.0
        } else {
            covered as f64 / key_phrases.len() as f64
        };

        let duration_min = (artifacts.effective_duration_s() / 60.0).max(1.0 / 60.0);
        let density = regions.len() as f64 / duration_min;
        let count_ratio = regions.len() as f64 / key_phrases.len().max(1) as f64;

        let emphasis_score = (40.0 * coverage.min(1.0)
            + 30.0 * (density / 5.0).min(1.0)
            + 30.0 * count_ratio.min(1.0))
        .min(100.0);

        let pitch_volume = (pitch_score + volume_score * 10.0) / 2.0;
        let score = (pitch_volume * 0.6 + emphasis_score * 0.4).round();

        let mean_pitch = voiced_values.iter().sum::<f32>() / voiced_values.len() as f32;
        debug!(
            "Prosody: gender {}, band [{}, {}], pitch score {:.0}, volume {:.1}, {} emphasis regions, score {:.0}",
            gender.label(),
            band.0,
            band.1,
            pitch_score,
            volume_score,
            regions.len(),
            score
        );

        let mut feedback = Vec::new();
        if pitch_score >= 90.0 {
            feedback.push(format!(
                "Excellent pitch control! Your voice stays within the ideal {} pitch range.",
                gender.label()
            ));
        } else if pitch_score >= 70.0 {
            feedback.push(format!(
                "Good pitch control. Your voice mostly stays within the ideal {} pitch range.",
                gender.label()
            ));
        } else if pitch_score >= 50.0 {
            feedback.push(format!(
                "Fair pitch control. Try to keep your voice more consistently within the ideal {} pitch range.",
                gender.label()
            ));
        } else {
            feedback.push(format!(
                "Your pitch varies significantly outside the ideal {} range. Focus on maintaining a more consistent pitch.",
                gender.label()
            ));
        }
        if time_too_high > time_too_low && time_too_high > 3.0 {
            feedback.push(
                "Your pitch tends to rise too high at times. Try to moderate your higher tones."
                    .to_string(),
            );
        } else if time_too_low > time_too_high && time_too_low > 3.0 {
            feedback.push(
                "Your pitch tends to drop too low at times. Add vocal variety while staying within the recommended range."
                    .to_string(),
            );
        }
        if coverage < 0.3 && !key_phrases.is_empty() {
            feedback.push(
                "Many important concepts weren't emphasized. Practice identifying and highlighting key points."
                    .to_string(),
            );
        }
        if density > 10.0 {
            feedback.push(
                "Too many emphasized segments may dilute their impact. Focus on the most important points."
                    .to_string(),
            );
        } else if density < 2.0 {
            feedback.push(
                "Add more emphasis to engage listeners and highlight important information."
                    .to_string(),
            );
        }

        Ok(AnalyzerResult::ok("prosody", score)
            .with_metric("detected_gender", gender.label())
            .with_metric("min_recommended_hz", band.0 as f64)
            .with_metric("max_recommended_hz", band.1 as f64)
            .with_metric("average_pitch_hz", round1(mean_pitch as f64))
            .with_metric("pitch_score", pitch_score)
            .with_metric("time_optimal_s", round1(time_optimal))
            .with_metric("time_too_low_s", round1(time_too_low))
            .with_metric("time_too_high_s", round1(time_too_high))
            .with_metric("volume_consistency", volume_score)
            .with_metric("emphasis_score", round1(emphasis_score))
            .with_metric("emphasized_segments", regions.len())
            .with_metric("emphasis_density_per_minute", round1(density))
            .with_metric("emphasis_coverage_percent", round1(coverage * 100.0))
            .with_feedback_lines(feedback))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_low_median_is_male() {
        let pitch: Vec<f32> = vec![120.0; 200];
        assert_eq!(detect_gender(&pitch, 0.0), DetectedGender::Male);
    }

    #[test]
    fn test_gender_high_median_is_female() {
        let pitch: Vec<f32> = vec![215.0; 200];
        assert_eq!(detect_gender(&pitch, 0.0), DetectedGender::Female);
    }

    #[test]
    fn test_gender_no_voiced_defaults_male() {
        assert_eq!(detect_gender(&[0.0, 0.0], 0.0), DetectedGender::Male);
    }

    #[test]
    fn test_gender_tie_break_shifts_borderline() {
        // Borderline contour: median just above 165, no tail evidence.
        let pitch: Vec<f32> = vec![170.0; 100];
        assert_eq!(detect_gender(&pitch, 0.0), DetectedGender::Female);
        // A strong male-leaning tie-break flips the borderline case.
        assert_eq!(detect_gender(&pitch, 1.0), DetectedGender::Male);
    }

    #[test]
    fn test_classify_band_counts() {
        let pitch = vec![0.0, 70.0, 120.0, 120.0, 120.0, 200.0, 0.0];
        let occupancy = classify_band(&pitch, MALE_PITCH_BAND);
        assert!(occupancy.optimal >= 3);
        assert_eq!(
            occupancy.voiced_total(),
            occupancy.optimal + occupancy.too_low + occupancy.too_high
        );
    }

    #[test]
    fn test_band_score_all_optimal() {
        let pitch = vec![120.0; 50];
        let occupancy = classify_band(&pitch, MALE_PITCH_BAND);
        assert_eq!(occupancy.score(), 100.0);
    }

    #[test]
    fn test_volume_consistency_flat_is_high() {
        let flat = vec![60.0f32; 100];
        assert!(volume_consistency(&flat) >= 8.0);
    }

    #[test]
    fn test_detect_emphasis_finds_loud_burst() {
        let mut intensity = vec![50.0f32; 100];
        let mut pitch = vec![120.0f32; 100];
        let flux = vec![0.1f32; 100];
        let proximity = vec![0.0f32; 100];
        for i in 40..44 {
            intensity[i] = 80.0;
            pitch[i] = 170.0;
        }
        let regions = detect_emphasis_regions(&intensity, &pitch, &flux, &proximity);
        assert!(!regions.is_empty());
        let (start, end) = regions[0];
        assert!((39..=45).contains(&start));
        assert!(end >= start);
    }

    #[test]
    fn test_emphasis_regions_merge_nearby_frames() {
        let mut intensity = vec![50.0f32; 60];
        intensity[20] = 90.0;
        intensity[23] = 90.0;
        let pitch = vec![120.0f32; 60];
        let flux = vec![0.0f32; 60];
        let proximity = vec![0.0f32; 60];
        let regions = detect_emphasis_regions(&intensity, &pitch, &flux, &proximity);
        assert_eq!(regions.len(), 1);
    }
}

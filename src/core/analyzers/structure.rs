//! Structure analyzer: intro/body/conclusion detection, section
//! proportions, and transition-based coherence.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use crate::core::nlp::{self, lexicon};
use crate::Result;
use async_trait::async_trait;
use log::debug;

/// Target proportion bands with the ±5 point envelope applied.
const INTRO_ENVELOPE: (f64, f64) = (0.05, 0.25);
const BODY_ENVELOPE: (f64, f64) = (0.55, 0.85);
const CONCLUSION_ENVELOPE: (f64, f64) = (0.05, 0.25);
/// Penalty per section whose proportion leaves its envelope.
const PROPORTION_PENALTY: f64 = 20.0;

/// Section boundary decision for one speech.
#[derive(Debug, Clone, Copy)]
pub struct SectionBounds {
    /// First body sentence index.
    pub intro_end: usize,
    /// First conclusion sentence index.
    pub conclusion_start: usize,
}

/// Derive section boundaries from marker positions.
///
/// Defaults carve the first and last fifth of the sentences; markers can
/// widen the intro up to 30% and pull the conclusion start down to 70%.
/// Overlapping bounds fall back to the defaults.
pub fn section_bounds(
    total: usize,
    intro_markers: &[usize],
    conclusion_markers: &[usize],
) -> SectionBounds {
    let default_intro_end = (total as f64 * 0.2) as usize;
    let default_conclusion_start = (total as f64 * 0.8) as usize;

    let mut intro_end = default_intro_end;
    if let Some(&last) = intro_markers.iter().max() {
        intro_end = (last + 3).min((total as f64 * 0.3) as usize);
    }
    let mut conclusion_start = default_conclusion_start;
    if let Some(&first) = conclusion_markers.iter().min() {
        conclusion_start = first
            .saturating_sub(1)
            .max((total as f64 * 0.7) as usize);
    }

    if intro_end >= conclusion_start {
        intro_end = default_intro_end;
        conclusion_start = default_conclusion_start;
    }
    SectionBounds {
        intro_end,
        conclusion_start,
    }
}

/// How the body is organized, inferred from ordering vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyOrganization {
    Sequential,
    Comparative,
    Causal,
    Topical,
    Unclear,
}

impl BodyOrganization {
    fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Comparative => "comparative",
            Self::Causal => "causal",
            Self::Topical => "topical",
            Self::Unclear => "unclear",
        }
    }

    fn coherence_bonus(&self) -> f64 {
        match self {
            Self::Sequential => 15.0,
            Self::Comparative | Self::Causal => 10.0,
            Self::Topical => 5.0,
            Self::Unclear => 0.0,
        }
    }
}

fn detect_body_organization(body_text: &str) -> BodyOrganization {
    let has = |words: &[&str]| words.iter().all(|w| nlp::contains_keyword(body_text, w));
    let started = lexicon::INTRO_KEYWORDS
        .iter()
        .chain(["first", "firstly", "to begin with"].iter())
        .any(|k| nlp::contains_keyword(body_text, k));
    if !started {
        return BodyOrganization::Unclear;
    }
    if has(&["first", "second"]) || has(&["one", "another"]) || has(&["first", "next"]) {
        BodyOrganization::Sequential
    } else if has(&["however", "despite"])
        || has(&["advantage", "disadvantage"])
        || has(&["pros", "cons"])
    {
        BodyOrganization::Comparative
    } else if has(&["because", "therefore"]) || has(&["cause", "effect"]) {
        BodyOrganization::Causal
    } else {
        BodyOrganization::Topical
    }
}

/// Completeness classification over the three sections.
fn completeness_label(has_intro: bool, has_body: bool, has_conclusion: bool) -> &'static str {
    match (has_intro, has_body, has_conclusion) {
        (true, true, true) => "complete",
        (true, true, false) => "missing_conclusion",
        (false, true, true) => "missing_introduction",
        (false, true, false) => "body_only",
        _ => "incomplete",
    }
}

fn completeness_bonus(label: &str) -> f64 {
    match label {
        "complete" => 20.0,
        "missing_conclusion" | "missing_introduction" => 10.0,
        "body_only" => 5.0,
        _ => 0.0,
    }
}

/// Intro/body/conclusion structure analyzer.
pub struct StructureAnalyzer;

#[async_trait]
impl Analyzer for StructureAnalyzer {
    fn id(&self) -> &'static str {
        "structure"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let text = artifacts.transcript.plain_text();
        let sentences = nlp::split_sentences(&text);
        if sentences.is_empty() {
            return Ok(AnalyzerResult::degraded(
                "structure",
                super::DEFAULT_SCORE,
                "empty transcript",
            )
            .with_feedback("No sentences were recognized, so structure could not be assessed."));
        }
        let total = sentences.len();

        let mut intro_markers = Vec::new();
        let mut conclusion_markers = Vec::new();
        for (i, sentence) in sentences.iter().enumerate() {
            let lower = sentence.to_lowercase();
            if nlp::contains_any(&lower, lexicon::INTRO_KEYWORDS) {
                intro_markers.push(i);
            }
            if nlp::contains_any(&lower, lexicon::CONCLUSION_KEYWORDS) {
                conclusion_markers.push(i);
            }
        }

        let bounds = section_bounds(total, &intro_markers, &conclusion_markers);
        let intro_len = bounds.intro_end;
        let body_len = bounds.conclusion_start - bounds.intro_end;
        let conclusion_len = total - bounds.conclusion_start;

        let intro_proportion = intro_len as f64 / total as f64;
        let body_proportion = body_len as f64 / total as f64;
        let conclusion_proportion = conclusion_len as f64 / total as f64;

        let mut proportion_score = 100.0;
        if !(INTRO_ENVELOPE.0..=INTRO_ENVELOPE.1).contains(&intro_proportion) {
            proportion_score -= PROPORTION_PENALTY;
        }
        if !(BODY_ENVELOPE.0..=BODY_ENVELOPE.1).contains(&body_proportion) {
            proportion_score -= PROPORTION_PENALTY;
        }
        if !(CONCLUSION_ENVELOPE.0..=CONCLUSION_ENVELOPE.1).contains(&conclusion_proportion) {
            proportion_score -= PROPORTION_PENALTY;
        }

        let has_intro = !intro_markers.is_empty() || intro_proportion >= 0.05;
        let has_conclusion = !conclusion_markers.is_empty() || conclusion_proportion >= 0.05;
        let has_body = body_proportion >= 0.5;
        let completeness = completeness_label(has_intro, has_body, has_conclusion);

        let body_text = sentences[bounds.intro_end..bounds.conclusion_start]
            .join(" ")
            .to_lowercase();
        let transition_count = nlp::count_occurrences(&body_text, lexicon::TRANSITION_KEYWORDS);
        let section_transition_count =
            nlp::count_occurrences(&body_text, lexicon::SECTION_TRANSITIONS);
        let transition_density = if body_len > 0 {
            transition_count as f64 / body_len as f64
        } else {
            0.0
        };

        let organization = detect_body_organization(&body_text);
        let coherence_score = (70.0
            + (section_transition_count as f64 * 5.0).min(15.0)
            + organization.coherence_bonus())
        .min(100.0);

        let completeness_points = completeness_bonus(completeness);
        let proportion_bonus = (proportion_score / 10.0).min(10.0).max(0.0);
        let coherence_bonus = ((coherence_score - 70.0) / 1.5).clamp(0.0, 20.0);
        let score = (70.0 + completeness_points + proportion_bonus + coherence_bonus).min(100.0);

        debug!(
            "Structure: {} sentences, bounds {}..{}, completeness {}, organization {}, score {:.1}",
            total,
            bounds.intro_end,
            bounds.conclusion_start,
            completeness,
            organization.label(),
            score
        );

        let mut feedback = Vec::new();
        if !has_intro {
            feedback.push("Add a clear introduction to establish your topic and purpose.".to_string());
        } else if intro_proportion < 0.10 {
            feedback.push(
                "Consider expanding your introduction to better prepare your audience.".to_string(),
            );
        }
        if !has_conclusion {
            feedback.push("Add a conclusion to summarize key points and provide closure.".to_string());
        } else if conclusion_proportion < 0.10 {
            feedback.push(
                "Expand your conclusion to reinforce your message and leave a lasting impression."
                    .to_string(),
            );
        }
        if organization == BodyOrganization::Unclear {
            feedback.push("Organize your main points more clearly with transition phrases.".to_string());
        } else if transition_count < 3 {
            feedback.push("Use more transition words to help your audience follow your speech.".to_string());
        }
        if feedback.is_empty() {
            feedback.push(if score >= 90.0 {
                "Excellent speech structure with well-balanced sections and smooth transitions."
                    .to_string()
            } else {
                "Good overall structure. Continue practicing to perfect your speech organization."
                    .to_string()
            });
        }

        Ok(AnalyzerResult::ok("structure", score)
            .with_metric("sentence_count", total)
            .with_metric("intro_percentage", round1(intro_proportion * 100.0))
            .with_metric("body_percentage", round1(body_proportion * 100.0))
            .with_metric("conclusion_percentage", round1(conclusion_proportion * 100.0))
            .with_metric("transition_count", transition_count + section_transition_count)
            .with_metric("transition_density", round2(transition_density))
            .with_metric("section_completeness", completeness)
            .with_metric("body_organization", organization.label())
            .with_metric("coherence_score", coherence_score)
            .with_feedback_lines(feedback))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzers::AnalyzerStatus;
    use crate::core::evaluation::test_support::{transcription_from_text, ArtifactsBuilder};

    fn well_formed_speech() -> String {
        let mut sentences: Vec<String> = Vec::new();
        sentences.push("Good morning everyone, today I would like to discuss renewable energy.".to_string());
        sentences.push("My goal is to explain why this topic matters to all of us.".to_string());
        for i in 0..8 {
            sentences.push(format!(
                "Furthermore, point number {} shows how solar adoption keeps accelerating.",
                i + 1
            ));
        }
        sentences.push("In conclusion, the evidence points one way.".to_string());
        sentences.push("Thus we should all support the transition.".to_string());
        sentences.join(" ")
    }

    #[test]
    fn test_section_bounds_defaults() {
        let bounds = section_bounds(20, &[], &[]);
        assert_eq!(bounds.intro_end, 4);
        assert_eq!(bounds.conclusion_start, 16);
    }

    #[test]
    fn test_section_bounds_markers_capped() {
        // A late intro marker cannot push the intro past 30%.
        let bounds = section_bounds(20, &[10], &[]);
        assert_eq!(bounds.intro_end, 6);
        // An early conclusion marker cannot start before 70%.
        let bounds = section_bounds(20, &[], &[5]);
        assert_eq!(bounds.conclusion_start, 14);
    }

    #[test]
    fn test_section_bounds_never_invert() {
        // Even adversarial marker placement cannot produce an intro that
        // starts after the conclusion; degenerate cases revert to the
        // defaults.
        for total in 1..40 {
            let bounds = section_bounds(total, &[total - 1], &[0]);
            assert!(
                bounds.intro_end <= bounds.conclusion_start,
                "inverted bounds for {} sentences",
                total
            );
        }
    }

    #[test]
    fn test_body_organization_detection() {
        assert_eq!(
            detect_body_organization("first we tried x and second we tried y today"),
            BodyOrganization::Sequential
        );
        assert_eq!(
            detect_body_organization("today the advantage is speed but the disadvantage is cost"),
            BodyOrganization::Comparative
        );
        assert_eq!(detect_body_organization("nothing special here"), BodyOrganization::Unclear);
    }

    #[tokio::test]
    async fn test_well_formed_speech_scores_high() {
        let artifacts = ArtifactsBuilder::new()
            .transcription(transcription_from_text(&well_formed_speech(), 120.0))
            .audio_duration(120.0)
            .build();
        let result = StructureAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Ok);
        assert!(result.score >= 90.0, "score {} too low", result.score);
        assert_eq!(
            result.metrics["section_completeness"],
            crate::core::analyzers::MetricValue::Text("complete".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_transcript_degrades() {
        let artifacts = ArtifactsBuilder::new()
            .transcription(crate::core::transcript::TranscriptionResult::default())
            .build();
        let result = StructureAnalyzer.analyze(&artifacts).await.unwrap();
        assert_eq!(result.status, AnalyzerStatus::Degraded);
        assert_eq!(result.score, crate::core::analyzers::DEFAULT_SCORE);
    }

    #[tokio::test]
    async fn test_score_bounded() {
        let artifacts = ArtifactsBuilder::new()
            .transcription(transcription_from_text(
                "one sentence with no structure at all",
                5.0,
            ))
            .build();
        let result = StructureAnalyzer.analyze(&artifacts).await.unwrap();
        assert!((0.0..=100.0).contains(&result.score));
    }
}

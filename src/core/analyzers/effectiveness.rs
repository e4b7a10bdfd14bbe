//! Effectiveness analyzer: topical relevance and purpose achievement.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use crate::core::nlp::embedding::{cosine_similarity, extract_keywords, keyword_overlap};
use crate::core::nlp::{self, lexicon};
use crate::Result;
use async_trait::async_trait;
use log::debug;

/// Keywords compared between topic and transcript.
const KEYWORD_COUNT: usize = 10;
/// Upper bound on the creative-content bonus.
const CREATIVE_BONUS_CAP: f64 = 2.0;

/// Piecewise mapping from cosine similarity in [0, 1] to relevance points
/// on the 0-10 scale.
pub fn similarity_points(similarity: f64) -> f64 {
    let s = similarity.clamp(0.0, 1.0);
    if s < 0.2 {
        s / 0.2 * 5.0
    } else if s < 0.4 {
        5.0 + (s - 0.2) / 0.2 * 1.5
    } else if s < 0.6 {
        6.5 + (s - 0.4) / 0.2 * 1.5
    } else if s < 0.8 {
        8.0 + (s - 0.6) / 0.2 * 1.0
    } else {
        (9.0 + (s - 0.8) / 0.2 * 1.0).min(10.0)
    }
}

/// Dominant purpose family and its keyword share over content words.
pub fn detect_purpose(words: &[String]) -> (&'static str, f64) {
    if words.is_empty() {
        return ("unclear", 0.0);
    }
    let mut best = ("unclear", 0.0f64);
    for (label, family) in lexicon::PURPOSE_FAMILIES {
        let matches = words
            .iter()
            .filter(|w| family.contains(&w.as_str()))
            .count();
        let strength = matches as f64 / words.len() as f64;
        if strength > best.1 {
            best = (label, strength);
        }
    }
    best
}

/// Creative-content bonus: narrative or emotional speeches with low
/// literal similarity get a bounded lift so figurative interpretations of
/// a topic are not punished.
pub fn creative_bonus(text_lower: &str, similarity: f64) -> f64 {
    if similarity >= 0.4 {
        return 0.0;
    }
    let narrative = nlp::count_occurrences(text_lower, lexicon::NARRATIVE_MARKERS);
    let emotional = nlp::count_occurrences(text_lower, lexicon::EMOTION_WORDS);
    if narrative == 0 && emotional == 0 {
        return 0.0;
    }
    ((narrative as f64 * 0.8 + emotional as f64 * 0.3) * (0.4 - similarity) / 0.4)
        .min(CREATIVE_BONUS_CAP)
}

/// Topical relevance and purpose analyzer.
pub struct EffectivenessAnalyzer;

#[async_trait]
impl Analyzer for EffectivenessAnalyzer {
    fn id(&self) -> &'static str {
        "effectiveness"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript, Feature::Topic]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let topic = artifacts
            .metadata
            .topic
            .as_deref()
            .ok_or_else(|| crate::error::VocalisError::analyzer("effectiveness", "topic missing"))?;

        let raw_text = artifacts.transcript.plain_text();
        let speech_text = nlp::preprocess_for_similarity(&raw_text);
        let topic_text = nlp::preprocess_for_similarity(topic);
        if speech_text.is_empty() || topic_text.is_empty() {
            return Ok(AnalyzerResult::degraded(
                "effectiveness",
                super::DEFAULT_SCORE,
                "empty transcript or topic",
            )
            .with_feedback("Unable to analyze topic relevance due to empty text."));
        }

        // Relevance: embedding similarity blended with keyword overlap.
        let embedder = artifacts.reference.embedder();
        let similarity = cosine_similarity(
            &embedder.embed(&speech_text),
            &embedder.embed(&topic_text),
        ) as f64;
        let similarity = similarity.clamp(0.0, 1.0);

        let stopwords = artifacts.reference.stopwords();
        let frequencies = artifacts.reference.frequencies();
        let topic_keywords = extract_keywords(&topic_text, KEYWORD_COUNT, frequencies, stopwords);
        let speech_keywords = extract_keywords(&speech_text, KEYWORD_COUNT, frequencies, stopwords);
        let overlap = keyword_overlap(&topic_keywords, &speech_keywords) as f64;

        let bonus = creative_bonus(&speech_text, similarity);
        let relevance =
            (similarity_points(similarity) * 0.7 + overlap * 10.0 * 0.3 + bonus).clamp(0.0, 10.0);

        // Purpose achievement: purpose-verb families plus discourse
        // structure alignment.
        let words = nlp::tokenize_words(&speech_text);
        let (purpose, strength) = detect_purpose(&words);
        let clarity = (strength * 5.0).min(1.0);

        let sentences = nlp::split_sentences(&raw_text);
        let intro_size = ((sentences.len() as f64 * 0.2).ceil() as usize).max(1);
        let intro_text = sentences
            .iter()
            .take(intro_size)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let purpose_in_intro = lexicon::PURPOSE_FAMILIES
            .iter()
            .any(|(_, family)| nlp::contains_any(&intro_text, family));
        let purpose_points = (clarity * 8.0 + if purpose_in_intro { 2.0 } else { 0.0 }).min(10.0);

        let has_intro = nlp::contains_any(&intro_text, lexicon::INTRO_KEYWORDS) || purpose_in_intro;
        let content_words = words
            .iter()
            .filter(|w| !stopwords.contains(w.as_str()))
            .count();
        let has_body = content_words >= 5;
        let tail_start = sentences.len().saturating_sub(intro_size);
        let conclusion_text = sentences[tail_start..]
            .join(" ")
            .to_lowercase();
        let has_conclusion = nlp::contains_any(&conclusion_text, lexicon::CONCLUSION_KEYWORDS);
        let discourse_count = nlp::count_occurrences(
            &speech_text,
            lexicon::DISCOURSE_MARKERS,
        );
        let discourse_density = discourse_count as f64 / sentences.len().max(1) as f64;

        let structural = ((has_intro as u8 as f64) * 2.5
            + (has_body as u8 as f64) * 2.5
            + (has_conclusion as u8 as f64) * 2.5
            + (discourse_density * 5.0).min(2.5))
        .min(10.0);

        let achievement = (purpose_points * 0.4 + structural * 0.6).clamp(0.0, 10.0);

        // Total 0-20, rescaled to 0-100 for aggregation.
        let total = relevance + achievement;
        let score = total / 20.0 * 100.0;

        debug!(
            "Effectiveness: similarity {:.3}, overlap {:.2}, bonus {:.2}, relevance {:.1}, achievement {:.1} -> {:.1}",
            similarity, overlap, bonus, relevance, achievement, score
        );

        let mut feedback = Vec::new();
        if similarity >= 0.75 {
            feedback.push(format!(
                "Good topic relevance. Your speech stays on topic with '{}'.",
                topic
            ));
        } else if similarity >= 0.4 {
            feedback.push(format!(
                "Moderate topic relevance. Your speech somewhat relates to '{}' but could be more focused.",
                topic
            ));
        } else {
            feedback.push(format!(
                "Limited topic relevance. Your speech touches on '{}' but frequently deviates from it.",
                topic
            ));
            feedback.push(
                "Try to make stronger connections to the main topic throughout your speech."
                    .to_string(),
            );
        }
        if !purpose_in_intro {
            feedback.push(
                "Consider stating your purpose clearly at the beginning of the speech."
                    .to_string(),
            );
        }
        if !has_conclusion {
            feedback.push("Consider adding a strong concluding statement.".to_string());
        }

        Ok(AnalyzerResult::ok("effectiveness", score)
            .with_metric("similarity", round2(similarity))
            .with_metric("keyword_overlap", round2(overlap))
            .with_metric("relevance_score", round1(relevance))
            .with_metric("achievement_score", round1(achievement))
            .with_metric("primary_purpose", purpose)
            .with_metric("purpose_in_introduction", if purpose_in_intro { 1.0 } else { 0.0 })
            .with_metric("creative_bonus", round2(bonus))
            .with_metric("key_speech_topics", speech_keywords)
            .with_feedback_lines(feedback))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Content-quality analyzer: vocabulary complexity, lexical diversity,
//! and syntactic cues.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use crate::core::nlp::frequency::{word_complexity, ComplexityWeights};
use crate::core::nlp::{self, lexicon};
use crate::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;

/// Verb suffixes and auxiliaries used as the part-of-speech proxy for
/// verbs. Tagging is abstracted behind these heuristics; they only need
/// to rank speeches against each other consistently.
const VERB_MARKERS: &[&str] = &[
    "is", "are", "was", "were", "be", "being", "been", "have", "has", "had", "do", "does",
    "did", "will", "would", "can", "could", "shall", "should", "may", "might", "must",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "al", "ic", "less"];

fn looks_like_verb(word: &str) -> bool {
    VERB_MARKERS.contains(&word)
        || word.ends_with("ing")
        || (word.ends_with("ed") && word.len() > 3)
        || (word.ends_with("es") && word.len() > 4)
}

fn looks_like_modifier(word: &str) -> bool {
    (word.ends_with("ly") && word.len() > 3)
        || ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| word.ends_with(suffix) && word.len() > suffix.len() + 2)
}

/// Syntactic cue summary over the tokenized text.
#[derive(Debug, Clone, Copy)]
pub struct SyntacticCues {
    pub verb_ratio: f64,
    pub modifier_ratio: f64,
    pub avg_sentence_length: f64,
    pub complex_sentence_ratio: f64,
}

impl SyntacticCues {
    /// Sentence-complexity sub-score on the 0-10 scale.
    pub fn complexity_score(&self) -> f64 {
        (self.verb_ratio * 3.0
            + self.modifier_ratio * 3.0
            + (self.avg_sentence_length / 20.0).min(1.0) * 2.0
            + self.complex_sentence_ratio * 2.0)
            .min(10.0)
    }
}

/// Compute the syntactic cues for the sentence-complexity sub-score.
pub fn syntactic_cues(sentences: &[String]) -> SyntacticCues {
    let mut verb_count = 0usize;
    let mut modifier_count = 0usize;
    let mut word_count = 0usize;
    let mut complex_sentences = 0usize;

    for sentence in sentences {
        let words = nlp::tokenize_words(sentence);
        if words
            .iter()
            .any(|w| lexicon::SUBORDINATORS.contains(&w.as_str()))
        {
            complex_sentences += 1;
        }
        for word in &words {
            if looks_like_verb(word) {
                verb_count += 1;
            }
            if looks_like_modifier(word) {
                modifier_count += 1;
            }
        }
        word_count += words.len();
    }

    let word_count_f = word_count.max(1) as f64;
    SyntacticCues {
        verb_ratio: verb_count as f64 / word_count_f,
        modifier_ratio: modifier_count as f64 / word_count_f,
        avg_sentence_length: word_count_f / sentences.len().max(1) as f64,
        complex_sentence_ratio: complex_sentences as f64 / sentences.len().max(1) as f64,
    }
}

/// Vocabulary and syntax analyzer.
pub struct ContentQualityAnalyzer;

#[async_trait]
impl Analyzer for ContentQualityAnalyzer {
    fn id(&self) -> &'static str {
        "content"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let text = artifacts.transcript.plain_text();
        let words = nlp::tokenize_words(&text);
        if words.is_empty() {
            return Ok(AnalyzerResult::degraded(
                "content",
                super::DEFAULT_SCORE,
                "empty transcript",
            )
            .with_feedback("No words were recognized, so vocabulary could not be assessed."));
        }

        let profile = artifacts.config.domain_profile(&artifacts.metadata.domain);
        let weights = ComplexityWeights {
            frequency: profile.complexity_weights.frequency,
            length: profile.complexity_weights.length,
            semantic: profile.complexity_weights.semantic,
        };
        let domain_terms: HashMap<String, f32> = profile
            .domain_terms
            .iter()
            .map(|(k, v)| (k.to_lowercase(), *v))
            .collect();
        let table = artifacts.reference.frequencies();

        // Word complexity distribution.
        let complexities: Vec<f32> = words
            .iter()
            .map(|w| word_complexity(w, table, weights, &domain_terms))
            .collect();
        let avg_complexity =
            complexities.iter().sum::<f32>() as f64 / complexities.len() as f64;
        let advanced_count = complexities.iter().filter(|&&c| c >= 2.5).count();
        let advanced_percentage = advanced_count as f64 / words.len() as f64 * 100.0;

        // Lexical diversity.
        let unique: std::collections::HashSet<&String> = words.iter().collect();
        let lexical_diversity = unique.len() as f64 / words.len() as f64;

        // Repetition of non-stopwords.
        let mut frequency_map: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            if !artifacts.reference.is_stopword(word) {
                *frequency_map.entry(word.as_str()).or_insert(0) += 1;
            }
        }
        let mut repeated_words: Vec<String> = frequency_map
            .iter()
            .filter(|&(_, &count)| count > 3)
            .map(|(word, _)| word.to_string())
            .collect();
        repeated_words.sort();

        // Syntactic cues.
        let sentences = nlp::split_sentences(&text);
        let cues = syntactic_cues(&sentences);

        // Domain vocabulary usage.
        let domain_hits = words
            .iter()
            .filter(|w| domain_terms.contains_key(w.as_str()))
            .count();
        let domain_percentage = domain_hits as f64 / words.len() as f64 * 100.0;
        let domain_appropriateness = (domain_percentage / 2.0).min(10.0);

        // Blend on the 0-10 scales: complexity 40%, syntax 30%,
        // diversity 30%, then rescale into the 0-100 band.
        let word_complexity_score = (avg_complexity * 3.0).min(10.0);
        let sentence_complexity = cues.complexity_score();
        let diversity_score = (lexical_diversity * 20.0).min(10.0);

        let mut score =
            word_complexity_score * 4.0 + sentence_complexity * 3.0 + diversity_score * 3.0;
        if domain_appropriateness > 0.0 {
            score = score * 0.9 + domain_appropriateness;
        }
        match repeated_words.len() {
            0..=3 => {}
            4..=5 => score -= 5.0,
            _ => score -= 10.0,
        }
        let mut score = score.clamp(50.0, 95.0);
        if advanced_percentage > 15.0 {
            score += 5.0;
        } else if advanced_percentage > 10.0 {
            score += 3.0;
        } else if advanced_percentage > 5.0 {
            score += 1.0;
        }
        let score = score.min(100.0);

        debug!(
            "Content: {} words, diversity {:.2}, avg complexity {:.2}, advanced {:.1}%, score {:.1}",
            words.len(),
            lexical_diversity,
            avg_complexity,
            advanced_percentage,
            score
        );

        let mut feedback = Vec::new();
        if lexical_diversity > 0.5 {
            feedback.push("Good vocabulary diversity and word choice.".to_string());
        } else {
            feedback.push(
                "Consider using a wider range of vocabulary to enhance your speech.".to_string(),
            );
        }
        if !repeated_words.is_empty() {
            let preview: Vec<&str> = repeated_words.iter().take(3).map(String::as_str).collect();
            feedback.push(format!(
                "Repetitive use of words detected: {}.",
                preview.join(", ")
            ));
        }
        if advanced_percentage > 10.0 {
            feedback.push("Excellent use of advanced vocabulary.".to_string());
        } else if advanced_percentage > 5.0 {
            feedback.push(
                "Good use of complex words. Consider incorporating more advanced vocabulary."
                    .to_string(),
            );
        } else {
            feedback.push(
                "Consider using more sophisticated vocabulary where appropriate.".to_string(),
            );
        }

        let mut result = AnalyzerResult::ok("content", score)
            .with_metric("word_count", words.len())
            .with_metric("unique_word_count", unique.len())
            .with_metric("lexical_diversity", round2(lexical_diversity))
            .with_metric("avg_word_complexity", round2(avg_complexity))
            .with_metric("advanced_word_percentage", round1(advanced_percentage))
            .with_metric("sentence_complexity", round1(sentence_complexity))
            .with_metric("avg_sentence_length", round1(cues.avg_sentence_length))
            .with_feedback_lines(feedback);
        if !repeated_words.is_empty() {
            let preview: Vec<String> = repeated_words.into_iter().take(5).collect();
            result = result.with_metric("repeated_words", preview);
        }
        if domain_appropriateness > 0.0 {
            result = result.with_metric("domain_appropriateness", round1(domain_appropriateness));
        }
        if table.is_none() {
            result = result.with_metric("word_frequency_table", "unavailable");
        }
        Ok(result)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

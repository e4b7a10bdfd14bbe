//! Disfluency analyzer: filler-word density and mid-sentence pause
//! severity.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use crate::core::nlp::clean_word;
use crate::core::transcript::{PauseSource, Token};
use crate::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;

/// Counts of mid-sentence pauses per severity bin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PauseBins {
    pub under_1_5: usize,
    pub between_1_5_and_3: usize,
    pub between_3_and_5: usize,
    pub over_5: usize,
}

impl PauseBins {
    fn total(&self) -> usize {
        self.under_1_5 + self.between_1_5_and_3 + self.between_3_and_5 + self.over_5
    }
}

/// Filler occurrences with their per-minute distribution.
#[derive(Debug, Default)]
pub struct FillerCounts {
    pub total: usize,
    pub total_words: usize,
    pub per_minute: BTreeMap<u32, usize>,
}

impl FillerCounts {
    /// Filler share of all words in [0, 1].
    pub fn density(&self) -> f64 {
        if self.total_words == 0 {
            0.0
        } else {
            self.total as f64 / self.total_words as f64
        }
    }
}

/// Count filler words over the timed token stream. Two-word fillers match
/// on consecutive word tokens.
pub fn count_fillers(tokens: &[Token], lexicon: &[String]) -> FillerCounts {
    let words: Vec<(&str, f64)> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Word { text, start, .. } => Some((text.as_str(), *start)),
            _ => None,
        })
        .collect();

    let singles: Vec<&String> = lexicon.iter().filter(|f| !f.contains(' ')).collect();
    let pairs: Vec<(&str, &str)> = lexicon
        .iter()
        .filter_map(|f| f.split_once(' '))
        .collect();

    let mut counts = FillerCounts {
        total_words: words.len(),
        ..Default::default()
    };
    let mut i = 0;
    while i < words.len() {
        let cleaned = clean_word(words[i].0);
        let minute = (words[i].1 / 60.0) as u32;

        let mut matched_pair = false;
        if i + 1 < words.len() {
            let next = clean_word(words[i + 1].0);
            if pairs.iter().any(|(a, b)| *a == cleaned && *b == next) {
                counts.total += 1;
                *counts.per_minute.entry(minute).or_insert(0) += 1;
                matched_pair = true;
            }
        }
        if matched_pair {
            i += 2;
            continue;
        }
        if singles.iter().any(|f| f.as_str() == cleaned) {
            counts.total += 1;
            *counts.per_minute.entry(minute).or_insert(0) += 1;
        }
        i += 1;
    }
    counts
}

/// Bin the mid-sentence intra-segment pauses by severity. A pause whose
/// preceding word closes a sentence is rhetorical, not disfluent, and is
/// not binned.
pub fn bin_mid_sentence_pauses(tokens: &[Token]) -> PauseBins {
    let mut bins = PauseBins::default();
    let mut previous_word: Option<&str> = None;
    for token in tokens {
        match token {
            Token::Word { text, .. } => previous_word = Some(text.as_str()),
            Token::Pause { duration_s, source } => {
                if *source != PauseSource::IntraSegment {
                    continue;
                }
                let sentence_final = previous_word
                    .map(|w| w.ends_with(['.', '!', '?']))
                    .unwrap_or(true);
                if sentence_final {
                    continue;
                }
                if *duration_s < 1.5 {
                    bins.under_1_5 += 1;
                } else if *duration_s <= 3.0 {
                    bins.between_1_5_and_3 += 1;
                } else if *duration_s <= 5.0 {
                    bins.between_3_and_5 += 1;
                } else {
                    bins.over_5 += 1;
                }
            }
        }
    }
    bins
}

/// Filler sub-score on the 0-10 scale.
pub fn filler_score(counts: &FillerCounts) -> f64 {
    let density = counts.density();
    let mut score = if density >= 0.15 {
        return 0.0;
    } else if density >= 0.10 {
        2.0
    } else if density >= 0.05 {
        4.0
    } else {
        (10.0 - density * 100.0).max(0.0)
    };

    for &count in counts.per_minute.values() {
        if count > 6 {
            score -= 4.0;
        } else if count > 4 {
            score -= 3.0;
        } else if count > 2 {
            score -= 2.0;
        }
    }
    score.max(0.0)
}

/// Pause sub-score on the 0-10 scale.
pub fn pause_score(bins: &PauseBins) -> f64 {
    if bins.over_5 > 0 {
        return 0.0;
    }
    let mut score: f64 = 10.0;
    if bins.under_1_5 > 3 {
        score -= 2.0;
    }
    if bins.between_1_5_and_3 > 2 {
        score -= 3.0;
    }
    if bins.between_3_and_5 > 1 {
        score -= 4.0;
    }
    if bins.total() > 8 {
        score -= 5.0;
    }
    score.max(0.0)
}

/// Filler and pause disfluency analyzer.
pub struct DisfluencyAnalyzer;

#[async_trait]
impl Analyzer for DisfluencyAnalyzer {
    fn id(&self) -> &'static str {
        "disfluency"
    }

    fn required_features(&self) -> &'static [Feature] {
        &[Feature::Transcript]
    }

    async fn analyze(&self, artifacts: &Artifacts) -> Result<AnalyzerResult> {
        let tokens = &artifacts.transcript.tokens;
        if artifacts.transcript.word_count == 0 {
            return Ok(AnalyzerResult::degraded(
                "disfluency",
                super::DEFAULT_SCORE,
                "empty transcript",
            )
            .with_feedback("No words were recognized, so fluency could not be assessed."));
        }

        let lexicon = artifacts.config.filler_lexicon();
        let fillers = count_fillers(tokens, &lexicon);
        let bins = bin_mid_sentence_pauses(tokens);

        let filler = filler_score(&fillers);
        let pause = pause_score(&bins);
        // A filler share of 15% or more is an automatic zero for the whole
        // component, not just the filler sub-score.
        let combined = if fillers.density() >= 0.15 {
            0.0
        } else {
            (filler * 0.6 + pause * 0.4) * 10.0
        };

        debug!(
            "Disfluency: {} fillers / {} words (density {:.3}), bins {:?}, filler {:.1}, pause {:.1}",
            fillers.total,
            fillers.total_words,
            fillers.density(),
            bins,
            filler,
            pause
        );

        let minute_breakdown: Vec<String> = fillers
            .per_minute
            .iter()
            .map(|(minute, count)| format!("minute {}: {}", minute + 1, count))
            .collect();

        let mut result = AnalyzerResult::ok("disfluency", combined)
            .with_metric("total_filler_words", fillers.total)
            .with_metric("filler_density", round3(fillers.density()))
            .with_metric("filler_score", filler)
            .with_metric("pause_score", pause)
            .with_metric("pauses_under_1_5s", bins.under_1_5)
            .with_metric("pauses_1_5s_to_3s", bins.between_1_5_and_3)
            .with_metric("pauses_3s_to_5s", bins.between_3_and_5)
            .with_metric("pauses_over_5s", bins.over_5);
        if !minute_breakdown.is_empty() {
            result = result.with_metric("fillers_per_minute", minute_breakdown);
        }

        if fillers.density() >= 0.10 {
            result = result.with_feedback(
                "Filler words dominate your delivery. Practice pausing silently instead of saying um or uh.",
            );
        } else if fillers.density() >= 0.05 {
            result = result.with_feedback(
                "Work on reducing filler words to sound more confident and articulate.",
            );
        } else if fillers.total > 0 {
            result = result.with_feedback("Good control of filler words overall.");
        } else {
            result = result.with_feedback("Excellent: no filler words detected.");
        }
        if bins.over_5 > 0 {
            result = result.with_feedback(
                "Very long mid-sentence pauses break your flow. Rehearse transitions between ideas.",
            );
        } else if bins.total() > 8 {
            result = result
                .with_feedback("Frequent mid-sentence pauses detected. Use pauses strategically rather than mid-thought.");
        }

        Ok(result)
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

//! Text embedding seam and the deterministic TF-IDF fallback.
//!
//! The effectiveness analyzer only depends on the [`TextEmbedder`]
//! contract; implementations may back it with a real sentence-embedding
//! model loaded from `embedding_model.bin`. The built-in fallback hashes
//! tokens into a fixed-width TF vector weighted by corpus rarity, which is
//! deterministic across runs and needs no model file.

use super::frequency::WordFrequencyTable;
use super::{lexicon, tokenize_words};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Embedding dimensionality of the fallback embedder.
pub const EMBEDDING_DIM: usize = 256;

/// Contract for turning text into a comparable vector.
pub trait TextEmbedder: Send + Sync {
    /// Embed the text into a fixed-dimension vector.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Cosine similarity of two vectors in [-1, 1]; zero vectors compare as 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Hashing TF-IDF embedder.
///
/// Tokens hash (FNV-1a, stable across platforms) into [`EMBEDDING_DIM`]
/// buckets; each bucket accumulates term frequency scaled by corpus
/// rarity when a frequency table is available.
pub struct TfIdfEmbedder {
    frequencies: Option<Arc<WordFrequencyTable>>,
    stopwords: HashSet<String>,
}

impl TfIdfEmbedder {
    /// Create an embedder over the optional frequency table and stopwords.
    pub fn new(
        frequencies: Option<Arc<WordFrequencyTable>>,
        stopwords: HashSet<String>,
    ) -> Self {
        Self {
            frequencies,
            stopwords,
        }
    }

    /// Embedder with the built-in stopword fallback and no table.
    pub fn builtin() -> Self {
        Self::new(
            None,
            lexicon::FALLBACK_STOPWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    fn rarity(&self, word: &str) -> f32 {
        match self.frequencies.as_deref().and_then(|t| t.get(word)) {
            // Rarer words carry more topical signal.
            Some(entry) => 1.0 + (100.0 - entry.percentile) / 50.0,
            None => 1.5,
        }
    }
}

impl TextEmbedder for TfIdfEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBEDDING_DIM];
        for word in tokenize_words(text) {
            if self.stopwords.contains(&word) || word.len() < 2 {
                continue;
            }
            let bucket = (fnv1a(&word) % EMBEDDING_DIM as u64) as usize;
            vector[bucket] += self.rarity(&word);
        }
        vector
    }
}

/// Stable 64-bit FNV-1a hash; the bucket assignment must not change
/// between runs or platforms.
fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

/// Top-`n` keywords of the text ranked by term frequency times rarity,
/// stopwords excluded. Ties break alphabetically so extraction stays
/// deterministic.
pub fn extract_keywords(
    text: &str,
    n: usize,
    frequencies: Option<&WordFrequencyTable>,
    stopwords: &HashSet<String>,
) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in tokenize_words(text) {
        if stopwords.contains(&word) || word.len() <= 2 {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut scored: Vec<(String, f32)> = counts
        .into_iter()
        .map(|(word, count)| {
            let rarity = match frequencies.and_then(|t| t.get(&word)) {
                Some(entry) => 1.0 + (100.0 - entry.percentile) / 50.0,
                None => 1.5,
            };
            (word, count as f32 * rarity)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.into_iter().take(n).map(|(word, _)| word).collect()
}

/// Overlap ratio between two keyword sets in [0, 1], measured against the
/// first set.
pub fn keyword_overlap(expected: &[String], found: &[String]) -> f32 {
    if expected.is_empty() {
        return 0.0;
    }
    let found_set: HashSet<&String> = found.iter().collect();
    let hits = expected.iter().filter(|k| found_set.contains(k)).count();
    hits as f32 / expected.len() as f32
}

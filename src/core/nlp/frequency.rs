//! Word-frequency percentile table and word-complexity scoring.
//!
//! The table ships as `word_frequencies.bin` in the reference data
//! directory: the common 16-byte header, then a `u32` record count, then
//! per record a length-prefixed lowercase word, its frequency percentile
//! (`f32`, higher = more common), the number of corpora it appeared in
//! (`u8`), and its dictionary sense count (`u8`).

use crate::core::reference::{read_header, FREQUENCY_MAGIC};
use crate::{Result, error::VocalisError};
use log::{debug, warn};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One word's corpus statistics.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyEntry {
    /// Percentile rank by corpus frequency; higher means more common.
    pub percentile: f32,
    /// Number of source corpora containing the word.
    pub source_count: u8,
    /// Dictionary sense count, the proxy for semantic depth.
    pub senses: u8,
}

/// Weights blending the complexity factors; provided by the active domain
/// profile.
#[derive(Debug, Clone, Copy)]
pub struct ComplexityWeights {
    pub frequency: f32,
    pub length: f32,
    pub semantic: f32,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            length: 0.2,
            semantic: 0.3,
        }
    }
}

/// In-memory percentile table.
#[derive(Debug, Default)]
pub struct WordFrequencyTable {
    entries: HashMap<String, FrequencyEntry>,
}

impl WordFrequencyTable {
    /// Load the table from `word_frequencies.bin`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = std::fs::File::open(path.as_ref())?;
        let header = read_header(&mut file)?;
        if header.magic != FREQUENCY_MAGIC {
            return Err(VocalisError::reference_data(format!(
                "bad magic in {}",
                path.as_ref().display()
            )));
        }
        if header.version != 1 {
            warn!(
                "word frequency table version {} is newer than supported",
                header.version
            );
        }

        let count = read_u32(&mut file)?;
        let mut entries = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let key_len = read_u16(&mut file)? as usize;
            let mut key_bytes = vec![0u8; key_len];
            file.read_exact(&mut key_bytes)?;
            let key = String::from_utf8(key_bytes).map_err(|e| {
                VocalisError::reference_data(format!("non-UTF-8 word record: {}", e))
            })?;
            let percentile = read_f32(&mut file)?;
            let mut tail = [0u8; 2];
            file.read_exact(&mut tail)?;
            entries.insert(
                key,
                FrequencyEntry {
                    percentile,
                    source_count: tail[0],
                    senses: tail[1],
                },
            );
        }
        debug!("Loaded {} word frequency records", entries.len());
        Ok(Self { entries })
    }

    /// Build a table from in-memory entries (tests and tools).
    pub fn from_entries(entries: HashMap<String, FrequencyEntry>) -> Self {
        Self { entries }
    }

    /// Look up a word's statistics.
    pub fn get(&self, word: &str) -> Option<FrequencyEntry> {
        self.entries.get(word).copied()
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Complexity of one word on the 1.0 (basic) to 3.0 (advanced) scale.
///
/// Blends a frequency factor from the percentile bands, a length factor,
/// and a semantic-depth factor from the sense count, under the domain
/// profile's weights; a domain-term adjustment is added on top. Without a
/// table the frequency factor falls back to the length factor so scoring
/// stays usable when the reference file is absent.
pub fn word_complexity(
    word: &str,
    table: Option<&WordFrequencyTable>,
    weights: ComplexityWeights,
    domain_terms: &HashMap<String, f32>,
) -> f32 {
    if !word.chars().all(char::is_alphabetic) {
        return 1.5;
    }

    let length_score = (word.len() as f32 / 3.5).clamp(1.0, 3.0);

    let (frequency_score, semantic_score) = match table.and_then(|t| t.get(word)) {
        Some(entry) => {
            let mut freq: f32 = if entry.percentile >= 75.0 {
                1.0
            } else if entry.percentile >= 50.0 {
                1.5
            } else if entry.percentile >= 25.0 {
                2.0
            } else {
                3.0
            };
            // Words present in several corpora are general vocabulary.
            if entry.source_count > 2 {
                freq = (freq - 0.5).max(1.0);
            }
            (freq, semantic_depth(entry.senses))
        }
        None if table.is_some() => (3.0, 1.5),
        None => (length_score, 1.5),
    };

    let adjustment = domain_terms.get(word).copied().unwrap_or(0.0);

    let score = frequency_score * weights.frequency
        + length_score * weights.length
        + semantic_score * weights.semantic
        + adjustment;
    score.clamp(1.0, 3.0)
}

/// Words with many senses are foundational vocabulary; few senses suggest
/// a specialized term.
fn semantic_depth(senses: u8) -> f32 {
    match senses {
        0 => 1.5,
        1..=2 => 2.2,
        3..=5 => 1.8,
        6..=10 => 1.4,
        _ => 1.1,
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::write_header;
    use std::io::Write;
    use tempfile::tempdir;

    fn entry(percentile: f32, source_count: u8, senses: u8) -> FrequencyEntry {
        FrequencyEntry {
            percentile,
            source_count,
            senses,
        }
    }

    fn sample_table() -> WordFrequencyTable {
        let mut entries = HashMap::new();
        entries.insert("the".to_string(), entry(99.0, 3, 12));
        entries.insert("house".to_string(), entry(80.0, 3, 8));
        entries.insert("garden".to_string(), entry(60.0, 2, 4));
        entries.insert("paradigm".to_string(), entry(10.0, 1, 2));
        WordFrequencyTable::from_entries(entries)
    }

    #[test]
    fn test_common_word_scores_low() {
        let table = sample_table();
        let score = word_complexity(
            "the",
            Some(&table),
            ComplexityWeights::default(),
            &HashMap::new(),
        );
        assert!(score < 1.5, "score {} too high for 'the'", score);
    }

    #[test]
    fn test_rare_word_scores_high() {
        let table = sample_table();
        let score = word_complexity(
            "paradigm",
            Some(&table),
            ComplexityWeights::default(),
            &HashMap::new(),
        );
        assert!(score > 2.2, "score {} too low for 'paradigm'", score);
    }

    #[test]
    fn test_unknown_word_with_table_treated_as_rare() {
        let table = sample_table();
        let with_unknown = word_complexity(
            "sesquipedalian",
            Some(&table),
            ComplexityWeights::default(),
            &HashMap::new(),
        );
        let known_common = word_complexity(
            "house",
            Some(&table),
            ComplexityWeights::default(),
            &HashMap::new(),
        );
        assert!(with_unknown > known_common);
    }

    #[test]
    fn test_domain_term_adjustment() {
        let table = sample_table();
        let mut domain_terms = HashMap::new();
        domain_terms.insert("garden".to_string(), 0.5f32);
        let boosted = word_complexity(
            "garden",
            Some(&table),
            ComplexityWeights::default(),
            &domain_terms,
        );
        let plain = word_complexity(
            "garden",
            Some(&table),
            ComplexityWeights::default(),
            &HashMap::new(),
        );
        assert!(boosted > plain);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let table = sample_table();
        for word in ["the", "house", "garden", "paradigm", "extraordinarily"] {
            let score = word_complexity(
                word,
                Some(&table),
                ComplexityWeights::default(),
                &HashMap::new(),
            );
            assert!((1.0..=3.0).contains(&score));
        }
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("word_frequencies.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        write_header(&mut file, FREQUENCY_MAGIC, 1).unwrap();
        file.write_all(&2u32.to_le_bytes()).unwrap();
        for (word, pct, sources, senses) in [("hello", 90.0f32, 3u8, 6u8), ("zyx", 1.0, 1, 0)] {
            file.write_all(&(word.len() as u16).to_le_bytes()).unwrap();
            file.write_all(word.as_bytes()).unwrap();
            file.write_all(&pct.to_le_bytes()).unwrap();
            file.write_all(&[sources, senses]).unwrap();
        }
        drop(file);

        let table = WordFrequencyTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!((table.get("hello").unwrap().percentile - 90.0).abs() < f32::EPSILON);
        assert_eq!(table.get("zyx").unwrap().source_count, 1);
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        write_header(&mut file, *b"WRONGMAG", 1).unwrap();
        file.write_all(&0u32.to_le_bytes()).unwrap();
        drop(file);
        assert!(WordFrequencyTable::load(&path).is_err());
    }
}

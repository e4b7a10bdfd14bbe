//! Pronouncing dictionary and phoneme categories.
//!
//! `pronunciation_dict.bin` maps lowercase words to ARPABET phoneme
//! sequences: the common 16-byte header, a `u32` record count, then per
//! record a length-prefixed word, a `u8` phoneme count, and that many
//! length-prefixed phoneme strings (stress digits stripped at build time).

use crate::core::reference::{read_header, PHONEME_MAGIC};
use crate::{Result, error::VocalisError};
use log::debug;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Articulatory category of one ARPABET phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhonemeCategory {
    Vowels,
    Stops,
    Fricatives,
    Affricates,
    Nasals,
    Liquids,
    Glides,
}

impl PhonemeCategory {
    /// All categories in a stable order.
    pub const ALL: [PhonemeCategory; 7] = [
        PhonemeCategory::Vowels,
        PhonemeCategory::Stops,
        PhonemeCategory::Fricatives,
        PhonemeCategory::Affricates,
        PhonemeCategory::Nasals,
        PhonemeCategory::Liquids,
        PhonemeCategory::Glides,
    ];

    /// Category of an ARPABET phoneme (stress digits ignored), if known.
    pub fn of(phoneme: &str) -> Option<Self> {
        let base: String = phoneme
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .collect::<String>()
            .to_uppercase();
        match base.as_str() {
            "AA" | "AE" | "AH" | "AO" | "AW" | "AY" | "EH" | "ER" | "EY" | "IH" | "IY"
            | "OW" | "OY" | "UH" | "UW" => Some(Self::Vowels),
            "B" | "D" | "G" | "K" | "P" | "T" => Some(Self::Stops),
            "DH" | "F" | "S" | "SH" | "TH" | "V" | "Z" | "ZH" => Some(Self::Fricatives),
            "CH" | "JH" => Some(Self::Affricates),
            "M" | "N" | "NG" => Some(Self::Nasals),
            "L" | "R" => Some(Self::Liquids),
            "W" | "Y" | "HH" => Some(Self::Glides),
            _ => None,
        }
    }

    /// Stable label for metrics and feedback.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vowels => "vowels",
            Self::Stops => "stops",
            Self::Fricatives => "fricatives",
            Self::Affricates => "affricates",
            Self::Nasals => "nasals",
            Self::Liquids => "liquids",
            Self::Glides => "glides",
        }
    }
}

/// Word-to-phonemes lookup table.
#[derive(Debug, Default)]
pub struct PhonemeDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl PhonemeDictionary {
    /// Load the dictionary from `pronunciation_dict.bin`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = std::fs::File::open(path.as_ref())?;
        let header = read_header(&mut file)?;
        if header.magic != PHONEME_MAGIC {
            return Err(VocalisError::reference_data(format!(
                "bad magic in {}",
                path.as_ref().display()
            )));
        }

        let mut count_buf = [0u8; 4];
        file.read_exact(&mut count_buf)?;
        let count = u32::from_le_bytes(count_buf);

        let mut entries = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let word = read_string(&mut file)?;
            let mut n = [0u8; 1];
            file.read_exact(&mut n)?;
            let mut phonemes = Vec::with_capacity(n[0] as usize);
            for _ in 0..n[0] {
                phonemes.push(read_string(&mut file)?);
            }
            entries.insert(word, phonemes);
        }
        debug!("Loaded {} pronunciation records", entries.len());
        Ok(Self { entries })
    }

    /// Build from in-memory entries (tests and tools).
    pub fn from_entries(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Phoneme sequence for a lowercase word.
    pub fn lookup(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(|v| v.as_slice())
    }

    /// Number of dictionary records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count expected phonemes per category across the given words.
    pub fn category_counts(&self, words: &[String]) -> HashMap<PhonemeCategory, usize> {
        let mut counts = HashMap::new();
        for word in words {
            if let Some(phonemes) = self.lookup(word) {
                for phoneme in phonemes {
                    if let Some(category) = PhonemeCategory::of(phoneme) {
                        *counts.entry(category).or_insert(0) += 1;
                    }
                }
            }
        }
        counts
    }
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes)
        .map_err(|e| VocalisError::reference_data(format!("non-UTF-8 record: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::write_header;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_category_of_strips_stress_digits() {
        assert_eq!(PhonemeCategory::of("AH0"), Some(PhonemeCategory::Vowels));
        assert_eq!(PhonemeCategory::of("T"), Some(PhonemeCategory::Stops));
        assert_eq!(PhonemeCategory::of("ZH"), Some(PhonemeCategory::Fricatives));
        assert_eq!(PhonemeCategory::of("XX"), None);
    }

    #[test]
    fn test_category_counts() {
        let mut entries = HashMap::new();
        entries.insert(
            "cat".to_string(),
            vec!["K".to_string(), "AE".to_string(), "T".to_string()],
        );
        let dict = PhonemeDictionary::from_entries(entries);
        let counts = dict.category_counts(&["cat".to_string(), "unknown".to_string()]);
        assert_eq!(counts[&PhonemeCategory::Stops], 2);
        assert_eq!(counts[&PhonemeCategory::Vowels], 1);
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pronunciation_dict.bin");
        let mut file = std::fs::File::create(&path).unwrap();
        write_header(&mut file, PHONEME_MAGIC, 1).unwrap();
        file.write_all(&1u32.to_le_bytes()).unwrap();
        let word = "dog";
        file.write_all(&(word.len() as u16).to_le_bytes()).unwrap();
        file.write_all(word.as_bytes()).unwrap();
        file.write_all(&[3u8]).unwrap();
        for phoneme in ["D", "AO", "G"] {
            file.write_all(&(phoneme.len() as u16).to_le_bytes()).unwrap();
            file.write_all(phoneme.as_bytes()).unwrap();
        }
        drop(file);

        let dict = PhonemeDictionary::load(&path).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(
            dict.lookup("dog").unwrap(),
            &["D".to_string(), "AO".to_string(), "G".to_string()]
        );
    }
}

//! Process-wide reference data with an explicit lifecycle.
//!
//! The reference directory holds the word-frequency percentile table, the
//! stopword list, the pronouncing dictionary, and optionally an embedding
//! model. Everything is loaded once at startup and shared read-only; a
//! missing file is tolerated and the dependent scoring falls back (word
//! complexity to the length factor, phoneme accuracy to recognizer
//! confidence, semantic similarity to the TF-IDF embedder).
//!
//! Binary files begin with a 16-byte header: an 8-byte magic, a `u32` LE
//! version, and a reserved `u32`.

use crate::core::nlp::embedding::{TextEmbedder, TfIdfEmbedder};
use crate::core::nlp::frequency::WordFrequencyTable;
use crate::core::nlp::lexicon;
use crate::core::nlp::phoneme::PhonemeDictionary;
use crate::{Result, error::VocalisError};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Magic for `word_frequencies.bin`.
pub const FREQUENCY_MAGIC: [u8; 8] = *b"VOCFREQ\0";
/// Magic for `pronunciation_dict.bin`.
pub const PHONEME_MAGIC: [u8; 8] = *b"VOCPHON\0";
/// Magic for `embedding_model.bin`.
pub const EMBEDDING_MAGIC: [u8; 8] = *b"VOCEMBD\0";

/// Parsed 16-byte reference file header.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceHeader {
    pub magic: [u8; 8],
    pub version: u32,
    pub reserved: u32,
}

/// Read and validate the fixed-size header.
pub fn read_header<R: Read>(reader: &mut R) -> Result<ReferenceHeader> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    let mut word = [0u8; 4];
    reader.read_exact(&mut word)?;
    let version = u32::from_le_bytes(word);
    reader.read_exact(&mut word)?;
    let reserved = u32::from_le_bytes(word);
    Ok(ReferenceHeader {
        magic,
        version,
        reserved,
    })
}

/// Write the fixed-size header (tools and tests).
pub fn write_header<W: Write>(writer: &mut W, magic: [u8; 8], version: u32) -> Result<()> {
    writer.write_all(&magic)?;
    writer.write_all(&version.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    Ok(())
}

/// Immutable process-wide reference tables.
pub struct ReferenceData {
    frequencies: Option<Arc<WordFrequencyTable>>,
    stopwords: HashSet<String>,
    phonemes: Option<Arc<PhonemeDictionary>>,
    embedder: Arc<dyn TextEmbedder>,
}

impl ReferenceData {
    /// Load from a reference directory, tolerating missing files.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();

        let frequencies = match WordFrequencyTable::load(dir.join("word_frequencies.bin")) {
            Ok(table) => {
                info!("Loaded word frequency table ({} words)", table.len());
                Some(Arc::new(table))
            }
            Err(e) => {
                warn!("Word frequency table unavailable: {}", e);
                None
            }
        };

        let stopwords = match std::fs::read_to_string(dir.join("stopwords.en.txt")) {
            Ok(content) => {
                let set: HashSet<String> = content
                    .lines()
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .collect();
                debug!("Loaded {} stopwords", set.len());
                set
            }
            Err(e) => {
                warn!("Stopword list unavailable ({}), using built-in fallback", e);
                lexicon::FALLBACK_STOPWORDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }
        };

        let phonemes = match PhonemeDictionary::load(dir.join("pronunciation_dict.bin")) {
            Ok(dict) => {
                info!("Loaded pronunciation dictionary ({} words)", dict.len());
                Some(Arc::new(dict))
            }
            Err(e) => {
                warn!("Pronunciation dictionary unavailable: {}", e);
                None
            }
        };

        // An embedding_model.bin would slot in here; until a model format
        // is settled the deterministic TF-IDF embedder is the backend.
        if dir.join("embedding_model.bin").exists() {
            debug!("embedding_model.bin present but unsupported, using TF-IDF embedder");
        }
        let embedder: Arc<dyn TextEmbedder> = Arc::new(TfIdfEmbedder::new(
            frequencies.clone(),
            stopwords.clone(),
        ));

        Self {
            frequencies,
            stopwords,
            phonemes,
            embedder,
        }
    }

    /// Built-in tables only; used when no reference directory exists and
    /// in tests.
    pub fn builtin() -> Self {
        let stopwords: HashSet<String> = lexicon::FALLBACK_STOPWORDS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            frequencies: None,
            stopwords: stopwords.clone(),
            phonemes: None,
            embedder: Arc::new(TfIdfEmbedder::new(None, stopwords)),
        }
    }

    /// Word frequency table, if loaded.
    pub fn frequencies(&self) -> Option<&WordFrequencyTable> {
        self.frequencies.as_deref()
    }

    /// Stopword set (never empty; falls back to the built-in list).
    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Pronouncing dictionary, if loaded.
    pub fn phonemes(&self) -> Option<&PhonemeDictionary> {
        self.phonemes.as_deref()
    }

    /// Active text embedder.
    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// True when a word is in the stopword set.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

static REFERENCE_DATA: OnceCell<Arc<ReferenceData>> = OnceCell::new();

/// Initialize the process-wide reference data from a directory. The first
/// caller wins; later calls are no-ops so request handling can never
/// reload tables mid-flight.
pub fn init_reference_data<P: AsRef<Path>>(dir: P) -> Arc<ReferenceData> {
    REFERENCE_DATA
        .get_or_init(|| Arc::new(ReferenceData::load(dir)))
        .clone()
}

/// The process-wide reference data, initializing with built-in fallbacks
/// when no directory was configured.
pub fn reference_data() -> Arc<ReferenceData> {
    REFERENCE_DATA
        .get_or_init(|| {
            warn!("Reference data requested before initialization, using built-in tables");
            Arc::new(ReferenceData::builtin())
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_header_round_trip() {
        let mut buf = Vec::new();
        write_header(&mut buf, FREQUENCY_MAGIC, 3).unwrap();
        assert_eq!(buf.len(), 16);
        let header = read_header(&mut buf.as_slice()).unwrap();
        assert_eq!(header.magic, FREQUENCY_MAGIC);
        assert_eq!(header.version, 3);
        assert_eq!(header.reserved, 0);
    }

    #[test]
    fn test_load_tolerates_missing_files() {
        let dir = tempdir().unwrap();
        let data = ReferenceData::load(dir.path());
        assert!(data.frequencies().is_none());
        assert!(data.phonemes().is_none());
        assert!(!data.stopwords().is_empty());
    }

    #[test]
    fn test_load_reads_stopword_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("stopwords.en.txt"),
            "# comment\nthe\nand\nWITH\n",
        )
        .unwrap();
        let data = ReferenceData::load(dir.path());
        assert!(data.is_stopword("the"));
        assert!(data.is_stopword("with"));
        assert!(!data.is_stopword("comment"));
    }

    #[test]
    fn test_builtin_has_stopwords_and_embedder() {
        let data = ReferenceData::builtin();
        assert!(data.is_stopword("the"));
        let v = data.embedder().embed("solar energy");
        assert!(v.iter().any(|&x| x > 0.0));
    }
}

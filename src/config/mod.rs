//! Configuration management module for Vocalis.
//!
//! This module provides the configuration service system with dependency
//! injection support and the complete type definitions for the pipeline.
//!
//! # Key Components
//!
//! - [`Config`] - Main configuration structure containing all settings
//! - [`ConfigService`] - Service interface for configuration management
//! - [`ProductionConfigService`] - Production implementation with file I/O
//! - [`TestConfigService`] - Test implementation with controlled behavior
//!
//! Unknown keys are rejected at load time; validation failures are fatal
//! at startup and never surface during request handling.
//!
//! # Examples
//!
//! ```rust
//! use vocalis_cli::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.transcriber.model, "whisper-1");
//! assert_eq!(config.analysis.gender_hint_default, "auto");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub mod service;
pub mod validator;

pub use service::{ConfigService, ProductionConfigService, TestConfigService};

use crate::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

// ============================================================================
// Configuration Type Definitions
// ============================================================================

/// Full application configuration for Vocalis.
///
/// Aggregates runtime limits, transcription service settings, and the
/// analysis parameters (weights, lexicons, domain profiles).
///
/// # Serialization
///
/// The struct round-trips through TOML for configuration files. Unknown
/// keys fail deserialization.
///
/// ```rust
/// use vocalis_cli::config::Config;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let toml_str = toml::to_string(&config)?;
/// assert!(toml_str.contains("[general]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// General runtime options (worker counts, timeouts).
    pub general: GeneralConfig,
    /// Transcription service configuration parameters.
    pub transcriber: TranscriberConfig,
    /// Analyzer weighting and analysis tuning.
    pub analysis: AnalysisConfig,
    /// Optional file path from which the configuration was loaded.
    /// Runtime metadata only; never serialized to the config file.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

/// General runtime configuration.
///
/// # Examples
///
/// ```rust
/// use vocalis_cli::config::GeneralConfig;
///
/// let general = GeneralConfig::default();
/// assert!(general.worker_count >= 1);
/// assert_eq!(general.analyzer_timeout_ms, 30_000);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct GeneralConfig {
    /// Number of analyzers allowed to execute simultaneously within one
    /// request. Defaults to the number of available CPU cores.
    pub worker_count: usize,
    /// Wall-clock budget per analyzer in milliseconds.
    pub analyzer_timeout_ms: u64,
    /// Upper bound on concurrently processed requests at the process
    /// boundary.
    pub max_concurrent_requests: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            analyzer_timeout_ms: 30_000,
            max_concurrent_requests: 4,
        }
    }
}

/// Transcription service configuration parameters.
///
/// # Examples
///
/// ```rust
/// use vocalis_cli::config::TranscriberConfig;
///
/// let transcriber = TranscriberConfig::default();
/// assert_eq!(transcriber.provider, "whisper-api");
/// assert_eq!(transcriber.max_retries, 3);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct TranscriberConfig {
    /// Transcription provider name.
    pub provider: String,
    /// API key for authentication.
    pub api_key: Option<String>,
    /// Model name requested from the endpoint.
    pub model: String,
    /// API base URL.
    pub base_url: String,
    /// Transcription language, or "auto" for detection.
    pub language: String,
    /// Sampling temperature passed to the model.
    pub temperature: f32,
    /// HTTP request timeout in seconds. Large uploads on slow links need
    /// generous values here.
    pub timeout_seconds: u64,
    /// Number of retries on request failure.
    pub max_retries: u32,
    /// Retry interval in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            provider: "whisper-api".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            language: "en".to_string(),
            temperature: 0.0,
            timeout_seconds: 120,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Analysis configuration: aggregation weights and analyzer tuning.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct AnalysisConfig {
    /// Aggregation weight per analyzer id; must sum to 1.0.
    pub weights: HashMap<String, f32>,
    /// Minimum recognizer confidence treated as reliable by confidence
    /// fallbacks.
    pub min_confidence: f32,
    /// Gender assumed when a request carries no hint: "male", "female",
    /// or "auto".
    pub gender_hint_default: String,
    /// Tie-break margin for auto gender detection. Zero is neutral;
    /// positive values lean the borderline cases male, negative female.
    pub gender_tie_break: f32,
    /// Override for the filler-word lexicon; `None` uses the built-in
    /// list.
    pub filler_words: Option<Vec<String>>,
    /// Reference data directory; `None` resolves next to the config file.
    pub reference_data_dir: Option<PathBuf>,
    /// Named domain scoring profiles; requests select one by name.
    pub domain_profiles: HashMap<String, DomainProfile>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            min_confidence: 0.5,
            gender_hint_default: "auto".to_string(),
            gender_tie_break: 0.0,
            filler_words: None,
            reference_data_dir: None,
            domain_profiles: default_domain_profiles(),
        }
    }
}

/// The canonical aggregation weight vector.
pub fn default_weights() -> HashMap<String, f32> {
    HashMap::from([
        ("effectiveness".to_string(), 0.16),
        ("structure".to_string(), 0.13),
        ("content".to_string(), 0.16),
        ("pronunciation".to_string(), 0.18),
        ("prosody".to_string(), 0.13),
        ("disfluency".to_string(), 0.12),
        ("timing".to_string(), 0.12),
    ])
}

/// Domain-specific scoring profile.
///
/// Domains shift how word complexity is weighted, reward their own
/// vocabulary, and may reweight the pronunciation sub-scores.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub struct DomainProfile {
    /// Blend weights for the word-complexity factors.
    pub complexity_weights: ComplexityWeightsConfig,
    /// Vocabulary rewarded in this domain, each with its complexity
    /// adjustment.
    pub domain_terms: HashMap<String, f32>,
    /// Optional override of the pronunciation sub-score weights.
    pub pronunciation_weights: Option<PronunciationWeightsConfig>,
}

/// Word-complexity factor weights.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields, default)]
pub struct ComplexityWeightsConfig {
    pub frequency: f32,
    pub length: f32,
    pub semantic: f32,
}

impl Default for ComplexityWeightsConfig {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            length: 0.2,
            semantic: 0.3,
        }
    }
}

/// Pronunciation sub-score weights.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields, default)]
pub struct PronunciationWeightsConfig {
    pub phoneme_accuracy: f32,
    pub prosody: f32,
    pub fluency: f32,
    pub articulation: f32,
}

impl Default for PronunciationWeightsConfig {
    fn default() -> Self {
        Self {
            phoneme_accuracy: 0.35,
            prosody: 0.25,
            fluency: 0.20,
            articulation: 0.20,
        }
    }
}

/// Built-in domain profiles registered under their request names.
pub fn default_domain_profiles() -> HashMap<String, DomainProfile> {
    let mut profiles = HashMap::new();

    profiles.insert("general".to_string(), DomainProfile::default());

    profiles.insert(
        "academic".to_string(),
        DomainProfile {
            complexity_weights: ComplexityWeightsConfig {
                frequency: 0.4,
                length: 0.2,
                semantic: 0.4,
            },
            domain_terms: HashMap::from([
                ("hypothesis".to_string(), 0.2),
                ("methodology".to_string(), 0.2),
                ("analysis".to_string(), 0.2),
                ("theoretical".to_string(), 0.2),
            ]),
            pronunciation_weights: Some(PronunciationWeightsConfig {
                phoneme_accuracy: 0.3,
                prosody: 0.3,
                fluency: 0.2,
                articulation: 0.2,
            }),
        },
    );

    profiles.insert(
        "business".to_string(),
        DomainProfile {
            complexity_weights: ComplexityWeightsConfig {
                frequency: 0.5,
                length: 0.1,
                semantic: 0.4,
            },
            domain_terms: HashMap::from([
                ("strategy".to_string(), 0.2),
                ("implementation".to_string(), 0.2),
                ("stakeholder".to_string(), 0.2),
            ]),
            pronunciation_weights: Some(PronunciationWeightsConfig {
                phoneme_accuracy: 0.25,
                prosody: 0.3,
                fluency: 0.25,
                articulation: 0.2,
            }),
        },
    );

    profiles.insert(
        "technical".to_string(),
        DomainProfile {
            complexity_weights: ComplexityWeightsConfig {
                frequency: 0.3,
                length: 0.3,
                semantic: 0.4,
            },
            domain_terms: HashMap::from([
                ("algorithm".to_string(), 0.3),
                ("implementation".to_string(), 0.2),
                ("interface".to_string(), 0.2),
            ]),
            pronunciation_weights: Some(PronunciationWeightsConfig {
                phoneme_accuracy: 0.4,
                prosody: 0.2,
                fluency: 0.2,
                articulation: 0.2,
            }),
        },
    );

    profiles.insert(
        "presentation".to_string(),
        DomainProfile {
            complexity_weights: ComplexityWeightsConfig {
                frequency: 0.4,
                length: 0.2,
                semantic: 0.4,
            },
            domain_terms: HashMap::new(),
            pronunciation_weights: Some(PronunciationWeightsConfig {
                phoneme_accuracy: 0.2,
                prosody: 0.4,
                fluency: 0.25,
                articulation: 0.15,
            }),
        },
    );

    profiles
}

impl Config {
    /// Resolve the active domain profile, falling back to `general`.
    pub fn domain_profile(&self, name: &str) -> DomainProfile {
        self.analysis
            .domain_profiles
            .get(name)
            .or_else(|| self.analysis.domain_profiles.get("general"))
            .cloned()
            .unwrap_or_default()
    }

    /// The effective filler lexicon as lowercase strings.
    pub fn filler_lexicon(&self) -> Vec<String> {
        match &self.analysis.filler_words {
            Some(words) => words.iter().map(|w| w.to_lowercase()).collect(),
            None => crate::core::nlp::lexicon::FILLER_WORDS
                .iter()
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

// ============================================================================
// Global configuration manager
// ============================================================================

static CONFIG_SERVICE: OnceCell<Arc<ProductionConfigService>> = OnceCell::new();

/// Initialize the process-wide configuration manager. Called once from
/// `main` before any command runs.
pub fn init_config_manager() -> Result<()> {
    let service = ProductionConfigService::new()?;
    // Validate eagerly so configuration problems fail at startup.
    service.get_config()?;
    let _ = CONFIG_SERVICE.set(Arc::new(service));
    Ok(())
}

/// The process-wide configuration service.
pub fn config_service() -> Result<Arc<ProductionConfigService>> {
    match CONFIG_SERVICE.get() {
        Some(service) => Ok(service.clone()),
        None => {
            let service = Arc::new(ProductionConfigService::new()?);
            let _ = CONFIG_SERVICE.set(service.clone());
            Ok(service)
        }
    }
}

/// Load the current configuration through the global service.
pub fn load_config() -> Result<Config> {
    config_service()?.get_config()
}

//! Comprehensive error types for the Vocalis CLI application operations.
//!
//! This module defines the `VocalisError` enum covering all error conditions
//! that can occur during audio probing, transcription, acoustic feature
//! extraction, analyzer execution, and general command execution.
//!
//! It also provides helper methods to construct errors and generate
//! user-friendly messages.
use thiserror::Error;

/// Represents all possible errors in the Vocalis application.
///
/// Each variant provides specific context to facilitate debugging and
/// user-friendly reporting.
///
/// # Examples
///
/// ```rust
/// use vocalis_cli::error::{VocalisError, VocalisResult};
///
/// fn example() -> VocalisResult<()> {
///     Err(VocalisError::Input {
///         message: "expected duration string is malformed".to_string(),
///     })
/// }
/// ```
///
/// # Exit Codes
///
/// Each error variant maps to an exit code via `VocalisError::exit_code`.
#[derive(Error, Debug)]
pub enum VocalisError {
    /// I/O operation failed during file system access.
    ///
    /// This variant wraps `std::io::Error` and provides context about
    /// file operations that failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error due to invalid or missing settings.
    ///
    /// Contains a human-readable message describing the issue. Raised only
    /// at load time; a running request never produces this variant.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Invalid request input: malformed audio, unreadable metadata, or an
    /// invalid expected-duration string. Surfaces to the caller before the
    /// pipeline runs.
    #[error("Input error: {message}")]
    Input {
        /// Description of the input error
        message: String,
    },

    /// The transcription adapter failed. The pipeline cannot continue
    /// without a transcript, so this surfaces as a whole-request failure.
    #[error("Transcription error: {message}")]
    Transcription {
        /// Detailed error message describing the failure
        message: String,
    },

    /// A specific acoustic feature could not be computed.
    ///
    /// Localized: analyzers depending on the feature degrade while the rest
    /// of the pipeline proceeds.
    #[error("Feature error [{kind}]: {message}")]
    Feature {
        /// The feature kind that failed (e.g. "pitch", "mfcc")
        kind: String,
        /// Detailed error message describing the failure
        message: String,
    },

    /// One analyzer crashed or exceeded its wall-clock budget.
    ///
    /// Localized: the analyzer's result becomes `failed` and the aggregator
    /// redistributes its weight.
    #[error("Analyzer error [{analyzer_id}]: {message}")]
    Analyzer {
        /// Identifier of the analyzer that failed
        analyzer_id: String,
        /// Detailed error message describing the failure
        message: String,
    },

    /// API request error with specified source.
    #[error("API error [{source:?}]: {message}")]
    Api {
        /// Error message from the API
        message: String,
        /// Source of the API error
        source: ApiErrorSource,
    },

    /// Audio processing error during decoding or resampling.
    #[error("Audio processing error: {message}")]
    AudioProcessing {
        /// Description of the audio processing error
        message: String,
    },

    /// Reference data file is missing, truncated, or has a bad header.
    #[error("Reference data error: {message}")]
    ReferenceData {
        /// Description of the reference data error
        message: String,
    },

    /// Indicates that the specified file was not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Generic command execution error.
    #[error("{0}")]
    CommandExecution(String),

    /// The provided path is invalid or malformed.
    #[error("Invalid path: {0}")]
    InvalidPath(std::path::PathBuf),

    /// Catch-all error variant wrapping any other failure.
    #[error("Unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

// Convert reqwest error to a transcription API error
impl From<reqwest::Error> for VocalisError {
    fn from(err: reqwest::Error) -> Self {
        VocalisError::Api {
            message: err.to_string(),
            source: ApiErrorSource::Whisper,
        }
    }
}

// Convert hound error to audio processing error
impl From<hound::Error> for VocalisError {
    fn from(err: hound::Error) -> Self {
        VocalisError::audio_processing(err.to_string())
    }
}

// Convert symphonia error to audio processing error
impl From<symphonia::core::errors::Error> for VocalisError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        VocalisError::audio_processing(err.to_string())
    }
}

// Convert config crate error to configuration error
impl From<config::ConfigError> for VocalisError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => VocalisError::Config {
                message: format!("Configuration file not found: {}", path),
            },
            config::ConfigError::Message(msg) => VocalisError::Config { message: msg },
            _ => VocalisError::Config {
                message: format!("Configuration error: {}", err),
            },
        }
    }
}

impl From<serde_json::Error> for VocalisError {
    fn from(err: serde_json::Error) -> Self {
        VocalisError::Config {
            message: format!("JSON serialization/deserialization error: {}", err),
        }
    }
}

/// Specialized `Result` type for Vocalis operations.
pub type VocalisResult<T> = Result<T, VocalisError>;

impl VocalisError {
    /// Create a configuration error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vocalis_cli::error::VocalisError;
    /// let err = VocalisError::config("invalid setting");
    /// assert_eq!(err.to_string(), "Configuration error: invalid setting");
    /// ```
    pub fn config<S: Into<String>>(message: S) -> Self {
        VocalisError::Config {
            message: message.into(),
        }
    }

    /// Create an input error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vocalis_cli::error::VocalisError;
    /// let err = VocalisError::input("unreadable audio header");
    /// assert_eq!(err.to_string(), "Input error: unreadable audio header");
    /// ```
    pub fn input<S: Into<String>>(message: S) -> Self {
        VocalisError::Input {
            message: message.into(),
        }
    }

    /// Create a transcription error with the given message.
    pub fn transcription<S: Into<String>>(message: S) -> Self {
        VocalisError::Transcription {
            message: message.into(),
        }
    }

    /// Create a feature extraction error for the given feature kind.
    pub fn feature<S1, S2>(kind: S1, message: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        VocalisError::Feature {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an analyzer error for the given analyzer identifier.
    pub fn analyzer<S1, S2>(analyzer_id: S1, message: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        VocalisError::Analyzer {
            analyzer_id: analyzer_id.into(),
            message: message.into(),
        }
    }

    /// Create an audio processing error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vocalis_cli::error::VocalisError;
    /// let err = VocalisError::audio_processing("decode failed");
    /// assert_eq!(err.to_string(), "Audio processing error: decode failed");
    /// ```
    pub fn audio_processing<S: Into<String>>(message: S) -> Self {
        VocalisError::AudioProcessing {
            message: message.into(),
        }
    }

    /// Create a reference data error with the given message.
    pub fn reference_data<S: Into<String>>(message: S) -> Self {
        VocalisError::ReferenceData {
            message: message.into(),
        }
    }

    /// Create a Whisper API error.
    pub fn whisper_api<T: Into<String>>(message: T) -> Self {
        Self::Api {
            message: message.into(),
            source: ApiErrorSource::Whisper,
        }
    }

    /// Create an analyzer timeout error with analyzer id and budget.
    pub fn analyzer_timeout(analyzer_id: &str, budget: std::time::Duration) -> Self {
        VocalisError::Analyzer {
            analyzer_id: analyzer_id.to_string(),
            message: format!("exceeded wall-clock budget of {:?}", budget),
        }
    }

    /// Return the corresponding exit code for this error variant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vocalis_cli::error::VocalisError;
    /// assert_eq!(VocalisError::config("x").exit_code(), 2);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            VocalisError::Io(_) => 1,
            VocalisError::Config { .. } => 2,
            VocalisError::Api { .. } => 3,
            VocalisError::Input { .. } => 4,
            VocalisError::Transcription { .. } => 5,
            VocalisError::AudioProcessing { .. } => 6,
            VocalisError::Feature { .. } => 7,
            VocalisError::Analyzer { .. } => 8,
            VocalisError::ReferenceData { .. } => 9,
            _ => 1,
        }
    }

    /// Return a user-friendly error message with suggested remedies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vocalis_cli::error::VocalisError;
    /// let msg = VocalisError::config("missing key").user_friendly_message();
    /// assert!(msg.contains("Configuration error:"));
    /// ```
    pub fn user_friendly_message(&self) -> String {
        match self {
            VocalisError::Io(e) => format!("File operation error: {}", e),
            VocalisError::Config { message } => format!(
                "Configuration error: {}\nHint: run 'vocalis-cli config --help' for details",
                message
            ),
            VocalisError::Input { message } => format!(
                "Input error: {}\nHint: check the audio file and request fields",
                message
            ),
            VocalisError::Transcription { message } => format!(
                "Transcription error: {}\nHint: check network connection and API key settings",
                message
            ),
            VocalisError::Api { message, source } => format!(
                "API error ({:?}): {}\nHint: check network connection and API key settings",
                source, message
            ),
            VocalisError::AudioProcessing { message } => format!(
                "Audio processing error: {}\nHint: ensure audio file integrity and a supported format",
                message
            ),
            VocalisError::Feature { kind, message } => {
                format!("Feature extraction error ({}): {}", kind, message)
            }
            VocalisError::Analyzer {
                analyzer_id,
                message,
            } => format!("Analyzer '{}' failed: {}", analyzer_id, message),
            VocalisError::ReferenceData { message } => format!(
                "Reference data error: {}\nHint: verify reference_data_dir in the configuration",
                message
            ),
            VocalisError::FileNotFound(path) => format!("File not found: {}", path),
            VocalisError::InvalidPath(path) => format!("Invalid path: {}", path.display()),
            VocalisError::CommandExecution(msg) => msg.clone(),
            VocalisError::Other(err) => {
                format!("Unknown error: {}\nHint: please report this issue", err)
            }
        }
    }
}

/// API error source enumeration.
///
/// Specifies the source of API-related errors to help with error diagnosis
/// and handling.
#[derive(Debug, thiserror::Error)]
pub enum ApiErrorSource {
    /// OpenAI-compatible transcription endpoint
    #[error("OpenAI")]
    OpenAI,
    /// Whisper API
    #[error("Whisper")]
    Whisper,
}

// Unit test: VocalisError error types and helper methods
#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_creation() {
        let error = VocalisError::config("test config error");
        assert!(matches!(error, VocalisError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: test config error");
    }

    #[test]
    fn test_input_error_creation() {
        let error = VocalisError::input("bad duration string");
        assert!(matches!(error, VocalisError::Input { .. }));
        assert_eq!(error.to_string(), "Input error: bad duration string");
    }

    #[test]
    fn test_feature_error_creation() {
        let error = VocalisError::feature("pitch", "empty frame buffer");
        let msg = error.to_string();
        assert!(msg.contains("pitch"));
        assert!(msg.contains("empty frame buffer"));
    }

    #[test]
    fn test_analyzer_error_creation() {
        let error = VocalisError::analyzer("prosody", "panicked");
        assert!(matches!(error, VocalisError::Analyzer { .. }));
        assert!(error.to_string().contains("prosody"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let vocalis_error: VocalisError = io_error.into();
        assert!(matches!(vocalis_error, VocalisError::Io(_)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(VocalisError::config("test").exit_code(), 2);
        assert_eq!(VocalisError::input("test").exit_code(), 4);
        assert_eq!(VocalisError::transcription("test").exit_code(), 5);
        assert_eq!(VocalisError::audio_processing("test").exit_code(), 6);
        assert_eq!(VocalisError::feature("pitch", "test").exit_code(), 7);
        assert_eq!(VocalisError::analyzer("timing", "test").exit_code(), 8);
    }

    #[test]
    fn test_user_friendly_messages() {
        let config_error = VocalisError::config("missing key");
        let message = config_error.user_friendly_message();
        assert!(message.contains("Configuration error:"));
        assert!(message.contains("vocalis-cli config --help"));

        let api_error = VocalisError::whisper_api("network failure");
        let message = api_error.user_friendly_message();
        assert!(message.contains("API error"));
        assert!(message.contains("check network connection"));
    }
}

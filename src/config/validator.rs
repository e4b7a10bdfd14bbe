//! Configuration validation.
//!
//! All checks run at load time. A configuration that passes here never
//! causes a request-time failure.

use crate::config::Config;
use crate::{Result, error::VocalisError};

/// Analyzer ids accepted in the weights map.
pub const KNOWN_ANALYZER_IDS: &[&str] = &[
    "effectiveness",
    "structure",
    "content",
    "pronunciation",
    "prosody",
    "disfluency",
    "timing",
];

/// Validate a complete configuration.
///
/// # Errors
///
/// Returns a [`VocalisError::Config`] describing the first violated
/// constraint.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_general(config)?;
    validate_transcriber(config)?;
    validate_weights(config)?;
    validate_analysis(config)?;
    Ok(())
}

fn validate_general(config: &Config) -> Result<()> {
    if config.general.worker_count == 0 {
        return Err(VocalisError::config("general.worker_count must be at least 1"));
    }
    if config.general.analyzer_timeout_ms == 0 {
        return Err(VocalisError::config(
            "general.analyzer_timeout_ms must be greater than 0",
        ));
    }
    if config.general.max_concurrent_requests == 0 {
        return Err(VocalisError::config(
            "general.max_concurrent_requests must be at least 1",
        ));
    }
    Ok(())
}

fn validate_transcriber(config: &Config) -> Result<()> {
    let t = &config.transcriber;
    if t.base_url.is_empty() {
        return Err(VocalisError::config("transcriber.base_url must not be empty"));
    }
    if !t.base_url.starts_with("http://") && !t.base_url.starts_with("https://") {
        return Err(VocalisError::config(format!(
            "transcriber.base_url must be an HTTP(S) URL, got '{}'",
            t.base_url
        )));
    }
    if !(0.0..=1.0).contains(&t.temperature) {
        return Err(VocalisError::config(format!(
            "transcriber.temperature must be within 0.0-1.0, got {}",
            t.temperature
        )));
    }
    if t.timeout_seconds == 0 {
        return Err(VocalisError::config(
            "transcriber.timeout_seconds must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_weights(config: &Config) -> Result<()> {
    let weights = &config.analysis.weights;
    if weights.is_empty() {
        return Err(VocalisError::config("analysis.weights must not be empty"));
    }
    for (id, weight) in weights {
        if !KNOWN_ANALYZER_IDS.contains(&id.as_str()) {
            return Err(VocalisError::config(format!(
                "analysis.weights contains unknown analyzer id '{}'",
                id
            )));
        }
        if *weight <= 0.0 {
            return Err(VocalisError::config(format!(
                "analysis.weights['{}'] must be positive, got {}",
                id, weight
            )));
        }
    }
    let total: f32 = weights.values().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(VocalisError::config(format!(
            "analysis.weights must sum to 1.0, got {:.6}",
            total
        )));
    }
    Ok(())
}

fn validate_analysis(config: &Config) -> Result<()> {
    let a = &config.analysis;
    if !(0.0..=1.0).contains(&a.min_confidence) {
        return Err(VocalisError::config(format!(
            "analysis.min_confidence must be within 0.0-1.0, got {}",
            a.min_confidence
        )));
    }
    if !matches!(a.gender_hint_default.as_str(), "male" | "female" | "auto") {
        return Err(VocalisError::config(format!(
            "analysis.gender_hint_default must be 'male', 'female', or 'auto', got '{}'",
            a.gender_hint_default
        )));
    }
    if !(-1.0..=1.0).contains(&a.gender_tie_break) {
        return Err(VocalisError::config(format!(
            "analysis.gender_tie_break must be within -1.0-1.0, got {}",
            a.gender_tie_break
        )));
    }
    if let Some(words) = &a.filler_words {
        if words.iter().any(|w| w.trim().is_empty()) {
            return Err(VocalisError::config(
                "analysis.filler_words must not contain empty entries",
            ));
        }
    }
    for (name, profile) in &a.domain_profiles {
        let w = profile.complexity_weights;
        let total = w.frequency + w.length + w.semantic;
        if (total - 1.0).abs() > 1e-6 {
            return Err(VocalisError::config(format!(
                "domain profile '{}' complexity weights must sum to 1.0, got {:.6}",
                name, total
            )));
        }
        if let Some(p) = profile.pronunciation_weights {
            let total = p.phoneme_accuracy + p.prosody + p.fluency + p.articulation;
            if (total - 1.0).abs() > 1e-6 {
                return Err(VocalisError::config(format!(
                    "domain profile '{}' pronunciation weights must sum to 1.0, got {:.6}",
                    name, total
                )));
            }
        }
    }
    Ok(())
}

//! Audio probing and decoding services.
//!
//! The probe reports duration and waveform metadata without decoding the
//! whole file where possible; the loader produces the mono 16 kHz sample
//! buffer that all acoustic feature extraction runs on.

pub mod loader;
pub mod probe;

pub use loader::{AudioLoader, ANALYSIS_SAMPLE_RATE};
pub use probe::AudioProbe;

use std::path::PathBuf;

/// Opaque handle to an audio resource plus its basic waveform metadata.
///
/// Created once per request by [`AudioProbe::probe`] and immutable
/// thereafter. Owned by the orchestrator for the request lifetime.
#[derive(Debug, Clone)]
pub struct AudioRef {
    /// Path to the audio resource.
    pub path: PathBuf,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source (downmixed to mono for analysis).
    pub channels: u16,
    /// Duration in seconds. Zero when the probe failed and the orchestrator
    /// chose to continue; timing-dependent analyzers then degrade.
    pub duration_s: f64,
}

impl AudioRef {
    /// Whether the probe produced a usable duration.
    pub fn has_duration(&self) -> bool {
        self.duration_s > 0.0
    }
}

/// Decoded audio data: mono samples at a known rate.
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Mono samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate of `samples` in Hz.
    pub sample_rate: u32,
    /// Duration in seconds derived from the sample count.
    pub duration_s: f64,
}

impl AudioData {
    /// Build from a mono sample buffer.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_s = samples.len() as f64 / sample_rate.max(1) as f64;
        Self {
            samples,
            sample_rate,
            duration_s,
        }
    }
}

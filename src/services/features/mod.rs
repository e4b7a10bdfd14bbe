//! Lazy acoustic feature extraction.
//!
//! Features are computed on first demand and memoized for the request;
//! every kind shares one frame grid (`FRAME_LENGTH` window, `HOP_LENGTH`
//! hop at 16 kHz) so analyzers can index-align pitch, intensity, and
//! spectral data. Concurrent callers of the same kind wait on the same
//! computation; once produced, the data is immutable and read without
//! locking.

pub mod pitch;
pub mod spectral;

use crate::services::audio::{AudioData, AudioLoader, AudioRef, ANALYSIS_SAMPLE_RATE};
use crate::{Result, error::VocalisError};
use log::debug;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Analysis window length in samples.
pub const FRAME_LENGTH: usize = 1024;
/// Hop between consecutive frames in samples.
pub const HOP_LENGTH: usize = 512;

/// Per-frame pitch contour; 0.0 denotes an unvoiced frame.
#[derive(Debug, Clone)]
pub struct PitchContour {
    pub values: Vec<f32>,
}

/// Per-frame intensity contour on a dB-like scale.
#[derive(Debug, Clone)]
pub struct IntensityContour {
    pub values: Vec<f32>,
}

/// MFCC matrix: one row of coefficients per frame.
#[derive(Debug, Clone)]
pub struct MfccMatrix {
    pub frames: Vec<Vec<f32>>,
}

/// Spectral shape statistics per frame.
#[derive(Debug, Clone)]
pub struct SpectralContours {
    pub centroid: Vec<f32>,
    pub bandwidth: Vec<f32>,
    pub zcr: Vec<f32>,
}

/// Onset strength envelope and picked onset frames.
#[derive(Debug, Clone)]
pub struct OnsetTrack {
    pub strength: Vec<f32>,
    pub onsets: Vec<usize>,
}

/// Request-scoped lazy feature loader.
///
/// Holds the decoded analysis buffer behind a `OnceCell` so the audio is
/// decoded at most once, and one cell per feature kind. The cancellation
/// token is checked at each loader boundary; an expired request stops
/// producing new features.
pub struct FeatureLoader {
    audio_ref: AudioRef,
    cancel: CancellationToken,
    audio: OnceCell<Arc<AudioData>>,
    pitch: OnceCell<Arc<PitchContour>>,
    intensity: OnceCell<Arc<IntensityContour>>,
    mfcc: OnceCell<Arc<MfccMatrix>>,
    spectral: OnceCell<Arc<SpectralContours>>,
    onsets: OnceCell<Arc<OnsetTrack>>,
}

impl FeatureLoader {
    /// Create a loader for the referenced audio.
    pub fn new(audio_ref: AudioRef, cancel: CancellationToken) -> Self {
        Self {
            audio_ref,
            cancel,
            audio: OnceCell::new(),
            pitch: OnceCell::new(),
            intensity: OnceCell::new(),
            mfcc: OnceCell::new(),
            spectral: OnceCell::new(),
            onsets: OnceCell::new(),
        }
    }

    /// Convert a frame index on the shared hop grid to seconds.
    pub fn frame_to_time(frame: usize) -> f64 {
        frame as f64 * HOP_LENGTH as f64 / ANALYSIS_SAMPLE_RATE as f64
    }

    /// Frames per minute of audio on the shared hop grid.
    pub fn frames_per_minute() -> f64 {
        60.0 * ANALYSIS_SAMPLE_RATE as f64 / HOP_LENGTH as f64
    }

    fn ensure_not_cancelled(&self, kind: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(VocalisError::feature(kind, "request cancelled"));
        }
        Ok(())
    }

    /// Decoded mono analysis buffer, loading on first use.
    pub async fn audio(&self) -> Result<Arc<AudioData>> {
        self.ensure_not_cancelled("audio")?;
        let audio_ref = self.audio_ref.clone();
        self.audio
            .get_or_try_init(|| async move {
                debug!("Decoding analysis audio for {:?}", audio_ref.path);
                let data = tokio::task::spawn_blocking(move || {
                    AudioLoader::load_analysis_data(&audio_ref)
                })
                .await
                .map_err(|e| VocalisError::feature("audio", e.to_string()))??;
                Ok::<_, VocalisError>(Arc::new(data))
            })
            .await
            .cloned()
    }

    /// Pitch contour, computing on first demand.
    pub async fn pitch(&self) -> Result<Arc<PitchContour>> {
        self.ensure_not_cancelled("pitch")?;
        let audio = self.audio().await?;
        self.pitch
            .get_or_try_init(|| async move {
                let values = tokio::task::spawn_blocking(move || {
                    pitch::track_pitch(&audio.samples, audio.sample_rate)
                })
                .await
                .map_err(|e| VocalisError::feature("pitch", e.to_string()))?;
                Ok::<_, VocalisError>(Arc::new(PitchContour { values }))
            })
            .await
            .cloned()
    }

    /// Intensity contour, computing on first demand.
    pub async fn intensity(&self) -> Result<Arc<IntensityContour>> {
        self.ensure_not_cancelled("intensity")?;
        let audio = self.audio().await?;
        self.intensity
            .get_or_try_init(|| async move {
                let values = tokio::task::spawn_blocking(move || {
                    spectral::intensity_contour(&audio.samples)
                })
                .await
                .map_err(|e| VocalisError::feature("intensity", e.to_string()))?;
                Ok::<_, VocalisError>(Arc::new(IntensityContour { values }))
            })
            .await
            .cloned()
    }

    /// MFCC matrix, computing on first demand.
    pub async fn mfcc(&self) -> Result<Arc<MfccMatrix>> {
        self.ensure_not_cancelled("mfcc")?;
        let audio = self.audio().await?;
        self.mfcc
            .get_or_try_init(|| async move {
                let frames = tokio::task::spawn_blocking(move || {
                    let magnitudes = spectral::stft_magnitudes(&audio.samples);
                    spectral::mfcc(&magnitudes, audio.sample_rate)
                })
                .await
                .map_err(|e| VocalisError::feature("mfcc", e.to_string()))?;
                Ok::<_, VocalisError>(Arc::new(MfccMatrix { frames }))
            })
            .await
            .cloned()
    }

    /// Spectral centroid, bandwidth, and ZCR contours.
    pub async fn spectral(&self) -> Result<Arc<SpectralContours>> {
        self.ensure_not_cancelled("spectral")?;
        let audio = self.audio().await?;
        self.spectral
            .get_or_try_init(|| async move {
                let contours = tokio::task::spawn_blocking(move || {
                    let magnitudes = spectral::stft_magnitudes(&audio.samples);
                    let (centroid, bandwidth) =
                        spectral::centroid_and_bandwidth(&magnitudes, audio.sample_rate);
                    let zcr = spectral::zero_crossing_rate(&audio.samples);
                    SpectralContours {
                        centroid,
                        bandwidth,
                        zcr,
                    }
                })
                .await
                .map_err(|e| VocalisError::feature("spectral", e.to_string()))?;
                Ok::<_, VocalisError>(Arc::new(contours))
            })
            .await
            .cloned()
    }

    /// Onset strength envelope and picked onsets.
    pub async fn onsets(&self) -> Result<Arc<OnsetTrack>> {
        self.ensure_not_cancelled("onsets")?;
        let audio = self.audio().await?;
        self.onsets
            .get_or_try_init(|| async move {
                let track = tokio::task::spawn_blocking(move || {
                    let magnitudes = spectral::stft_magnitudes(&audio.samples);
                    let (strength, onsets) = spectral::onsets(&magnitudes);
                    OnsetTrack { strength, onsets }
                })
                .await
                .map_err(|e| VocalisError::feature("onsets", e.to_string()))?;
                Ok::<_, VocalisError>(Arc::new(track))
            })
            .await
            .cloned()
    }
}

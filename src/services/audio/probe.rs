//! Audio probe reporting duration and waveform metadata.
//!
//! WAV files are inspected through their header without decoding; other
//! formats fall back to a Symphonia decode pass over the packet stream.

use super::AudioRef;
use crate::{Result, error::VocalisError};
use log::{debug, warn};
use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

/// Audio metadata probe.
///
/// Attempts format-specific inspection first (WAV header read), then a
/// decoded-frame fallback for other containers. All failures surface as
/// [`VocalisError::AudioProcessing`]; the orchestrator may choose to
/// continue with a zero duration.
pub struct AudioProbe;

impl AudioProbe {
    /// Probe an audio file and return its [`AudioRef`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or no strategy could
    /// read its metadata.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<AudioRef> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VocalisError::FileNotFound(path.display().to_string()));
        }

        match Self::probe_wav_header(path) {
            Ok(audio_ref) => return Ok(audio_ref),
            Err(e) => {
                debug!("WAV header probe failed for {:?}: {}", path, e);
            }
        }

        Self::probe_with_symphonia(path).map_err(|e| {
            warn!("All probe strategies failed for {:?}: {}", path, e);
            e
        })
    }

    /// Fast path: read the WAV header via hound without decoding samples.
    fn probe_wav_header(path: &Path) -> Result<AudioRef> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let frames = reader.duration();
        let duration_s = frames as f64 / spec.sample_rate.max(1) as f64;
        debug!(
            "WAV header probe: sample_rate={}, channels={}, duration={:.3}s",
            spec.sample_rate, spec.channels, duration_s
        );
        Ok(AudioRef {
            path: path.to_path_buf(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_s,
        })
    }

    /// Fallback: probe the container with Symphonia and derive the duration
    /// from the selected track's parameters.
    fn probe_with_symphonia(path: &Path) -> Result<AudioRef> {
        let file = File::open(path).map_err(|e| {
            VocalisError::audio_processing(format!("Failed to open audio file: {}", e))
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(&hint, mss, &FormatOptions::default(), &Default::default())
            .map_err(|e| {
                VocalisError::audio_processing(format!("Failed to probe format: {}", e))
            })?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.sample_rate.is_some())
            .ok_or_else(|| VocalisError::audio_processing("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| VocalisError::audio_processing("Sample rate unknown".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(1);

        let duration_s = match (track.codec_params.n_frames, track.codec_params.time_base) {
            (Some(frames), Some(tb)) => {
                frames as f64 * tb.numer as f64 / tb.denom as f64
            }
            (Some(frames), None) => frames as f64 / sample_rate as f64,
            _ => 0.0,
        };

        debug!(
            "Symphonia probe: sample_rate={}, channels={}, duration={:.3}s",
            sample_rate, channels, duration_s
        );
        Ok(AudioRef {
            path: path.to_path_buf(),
            sample_rate,
            channels,
            duration_s,
        })
    }
}

//! Audio decoding into the shared analysis buffer.
//!
//! Every acoustic feature runs on the same mono buffer at
//! [`ANALYSIS_SAMPLE_RATE`]. WAV input decodes through hound; other
//! containers go through Symphonia. Multi-channel input is downmixed by
//! averaging and the result is resampled with rubato when the native rate
//! differs from the analysis rate.

use super::{AudioData, AudioRef};
use crate::{Result, error::VocalisError};
use log::{debug, trace};
use rubato::{FftFixedIn, Resampler};
use std::fs::File;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

/// Sample rate all acoustic features are computed at.
pub const ANALYSIS_SAMPLE_RATE: u32 = 16_000;

/// Decoder producing the shared mono analysis buffer.
pub struct AudioLoader;

impl AudioLoader {
    /// Decode the referenced audio into mono samples at the analysis rate.
    ///
    /// # Errors
    ///
    /// Returns an error when no decoder can read the file or resampling
    /// fails.
    pub fn load_analysis_data(audio_ref: &AudioRef) -> Result<AudioData> {
        let (samples, sample_rate, channels) = match Self::decode_wav(audio_ref) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("hound decode failed for {:?}: {}, trying Symphonia", audio_ref.path, e);
                Self::decode_with_symphonia(audio_ref)?
            }
        };

        let mono = downmix(&samples, channels);
        debug!(
            "Decoded {} frames at {} Hz ({} channels)",
            mono.len(),
            sample_rate,
            channels
        );

        let resampled = if sample_rate == ANALYSIS_SAMPLE_RATE {
            mono
        } else {
            resample(&mono, sample_rate, ANALYSIS_SAMPLE_RATE)?
        };

        Ok(AudioData::new(resampled, ANALYSIS_SAMPLE_RATE))
    }

    fn decode_wav(audio_ref: &AudioRef) -> Result<(Vec<f32>, u32, u16)> {
        let mut reader = hound::WavReader::open(&audio_ref.path)?;
        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };
        Ok((samples, spec.sample_rate, spec.channels))
    }

    fn decode_with_symphonia(audio_ref: &AudioRef) -> Result<(Vec<f32>, u32, u16)> {
        let file = File::open(&audio_ref.path).map_err(|e| {
            VocalisError::audio_processing(format!("Failed to open audio file: {}", e))
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = audio_ref.path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(&hint, mss, &FormatOptions::default(), &Default::default())
            .map_err(|e| {
                VocalisError::audio_processing(format!("Failed to probe format: {}", e))
            })?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.sample_rate.is_some())
            .ok_or_else(|| VocalisError::audio_processing("No audio track found".to_string()))?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| VocalisError::audio_processing("Sample rate unknown".to_string()))?;
        let channels = track.codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                VocalisError::audio_processing(format!("Failed to create decoder: {}", e))
            })?;

        let mut samples = Vec::new();
        while let Ok(packet) = format.next_packet() {
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = decoder.decode(&packet).map_err(|e| {
                VocalisError::audio_processing(format!("Decode error: {}", e))
            })?;
            let spec = *decoded.spec();
            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }
        trace!("Symphonia decode produced {} interleaved samples", samples.len());

        Ok((samples, sample_rate, channels))
    }
}

/// Average interleaved channels into a mono buffer.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Resample mono f32 audio to the target sample rate via rubato.
fn resample(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }
    let chunk_size = 8192;
    let mut resampler =
        FftFixedIn::<f32>::new(input_rate as usize, output_rate as usize, chunk_size, 1, 1)
            .map_err(|e| {
                VocalisError::audio_processing(format!("Failed to create resampler: {}", e))
            })?;

    let ratio = output_rate as f64 / input_rate as f64;
    let mut output: Vec<f32> = Vec::with_capacity((input.len() as f64 * ratio) as usize + 128);
    let mut pos = 0;
    while pos < input.len() {
        let frames_needed = resampler.input_frames_next();
        let end = (pos + frames_needed).min(input.len());
        let mut chunk: Vec<f32> = Vec::with_capacity(frames_needed);
        chunk.extend_from_slice(&input[pos..end]);
        if end - pos < frames_needed {
            chunk.resize(frames_needed, 0.0);
        }
        let chunk_ref = [&chunk[..]];
        let out_chunk = resampler
            .process(&chunk_ref, None)
            .map_err(|e| VocalisError::audio_processing(format!("Resample error: {}", e)))?;
        output.extend_from_slice(&out_chunk[0]);
        pos += frames_needed;
    }

    let expected_len = (input.len() as f64 * ratio).round() as usize;
    if output.len() > expected_len {
        output.truncate(expected_len);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let interleaved = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix(&interleaved, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn test_resample_halves_length() {
        let input: Vec<f32> = (0..32_000)
            .map(|i| (i as f32 / 32_000.0 * 440.0 * std::f32::consts::TAU).sin())
            .collect();
        let output = resample(&input, 32_000, 16_000).unwrap();
        let expected = input.len() / 2;
        assert!((output.len() as i64 - expected as i64).unsigned_abs() < 64);
    }

    #[test]
    fn test_resample_same_rate_passthrough() {
        let input = vec![0.25f32; 1000];
        let output = resample(&input, 16_000, 16_000).unwrap();
        assert_eq!(output.len(), input.len());
    }
}

//! Autocorrelation pitch tracker.
//!
//! Frames are scored over the 50-600 Hz search band; frames whose best
//! normalized autocorrelation peak is weak, or whose energy is near the
//! noise floor, are marked unvoiced with the sentinel value 0.0.

use super::{FRAME_LENGTH, HOP_LENGTH};
use log::trace;

/// Lowest fundamental considered voiced.
pub const PITCH_FMIN: f32 = 50.0;
/// Highest fundamental considered voiced.
pub const PITCH_FMAX: f32 = 600.0;

/// Normalized autocorrelation peak below which a frame is unvoiced.
const VOICING_THRESHOLD: f32 = 0.30;
/// RMS below which a frame is treated as silence.
const ENERGY_FLOOR: f32 = 1e-3;

/// Per-frame pitch contour in Hz; 0.0 denotes an unvoiced frame.
pub fn track_pitch(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let min_lag = (sample_rate as f32 / PITCH_FMAX).floor() as usize;
    let max_lag = (sample_rate as f32 / PITCH_FMIN).ceil() as usize;
    let mut contour = Vec::new();

    if samples.len() < FRAME_LENGTH || max_lag >= FRAME_LENGTH {
        return contour;
    }

    let mut start = 0;
    while start + FRAME_LENGTH <= samples.len() {
        let frame = &samples[start..start + FRAME_LENGTH];
        contour.push(frame_pitch(frame, sample_rate, min_lag, max_lag));
        start += HOP_LENGTH;
    }
    trace!("Pitch contour: {} frames", contour.len());
    contour
}

fn frame_pitch(frame: &[f32], sample_rate: u32, min_lag: usize, max_lag: usize) -> f32 {
    let energy: f32 = frame.iter().map(|s| s * s).sum();
    let rms = (energy / frame.len() as f32).sqrt();
    if rms < ENERGY_FLOOR {
        return 0.0;
    }

    let upper = max_lag.min(frame.len() - 1);
    let mut correlations = Vec::with_capacity(upper + 1 - min_lag);
    let mut best_corr = 0.0f32;
    for lag in min_lag..=upper {
        let mut corr = 0.0f32;
        let mut norm = 0.0f32;
        for i in 0..frame.len() - lag {
            corr += frame[i] * frame[i + lag];
            norm += frame[i + lag] * frame[i + lag];
        }
        let denom = (energy * norm).sqrt();
        let normalized = if denom > 0.0 { corr / denom } else { 0.0 };
        correlations.push(normalized);
        if normalized > best_corr {
            best_corr = normalized;
        }
    }

    if best_corr < VOICING_THRESHOLD {
        return 0.0;
    }
    // Period multiples correlate almost as strongly as the fundamental;
    // the smallest lag within tolerance of the maximum is the period.
    let lag = correlations
        .iter()
        .position(|&c| c >= best_corr * 0.98)
        .map(|offset| min_lag + offset);
    match lag {
        Some(lag) if lag > 0 => sample_rate as f32 / lag as f32,
        _ => 0.0,
    }
}

/// Odd-kernel median filter used to stabilize pitch contours before
/// classification. Unvoiced frames participate so isolated spikes vanish.
pub fn median_filter(values: &[f32], kernel: usize) -> Vec<f32> {
    if values.is_empty() || kernel <= 1 {
        return values.to_vec();
    }
    let half = kernel / 2;
    let mut filtered = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(values.len());
        let mut window: Vec<f32> = values[lo..hi].to_vec();
        window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        filtered.push(window[window.len() / 2]);
    }
    filtered
}

/// Voiced values only (pitch > 0), for statistics over the contour.
pub fn voiced(values: &[f32]) -> Vec<f32> {
    values.iter().copied().filter(|&v| v > 0.0).collect()
}

/// Percentile over a sorted copy; `p` in [0, 100].
pub fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p / 100.0 * (sorted.len() - 1) as f32).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let total = (seconds * sample_rate as f32) as usize;
        (0..total)
            .map(|i| (i as f32 / sample_rate as f32 * freq * std::f32::consts::TAU).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_tracks_sine_fundamental() {
        let samples = sine(120.0, 1.0, 16_000);
        let contour = track_pitch(&samples, 16_000);
        let voiced_frames = voiced(&contour);
        assert!(!voiced_frames.is_empty());
        let mean: f32 = voiced_frames.iter().sum::<f32>() / voiced_frames.len() as f32;
        assert!((mean - 120.0).abs() < 6.0, "mean pitch {} not near 120", mean);
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let samples = vec![0.0f32; 16_000];
        let contour = track_pitch(&samples, 16_000);
        assert!(contour.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_median_filter_removes_spike() {
        let values = vec![100.0, 100.0, 500.0, 100.0, 100.0];
        let filtered = median_filter(&values, 5);
        assert_eq!(filtered[2], 100.0);
    }

    #[test]
    fn test_percentile_bounds() {
        let values = vec![10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 100.0), 40.0);
    }
}

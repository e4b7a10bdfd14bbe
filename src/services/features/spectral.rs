//! STFT-based spectral features: intensity, MFCCs, centroid, bandwidth,
//! zero-crossing rate, and onset strength with peak picking.
//!
//! All features share one frame grid (`FRAME_LENGTH` window, `HOP_LENGTH`
//! hop) so analyzers can index-align them.

use super::{FRAME_LENGTH, HOP_LENGTH};
use log::trace;
use rustfft::{FftPlanner, num_complex::Complex};

/// Number of mel filters in the MFCC filterbank.
const N_MELS: usize = 26;
/// Number of cepstral coefficients retained.
pub const N_MFCC: usize = 13;

/// Magnitude spectra for each frame, `FRAME_LENGTH / 2 + 1` bins per frame.
pub fn stft_magnitudes(samples: &[f32]) -> Vec<Vec<f32>> {
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FRAME_LENGTH);
    let window = hann_window(FRAME_LENGTH);
    let bins = FRAME_LENGTH / 2 + 1;

    let mut frames = Vec::new();
    let mut start = 0;
    let mut buffer = vec![Complex::new(0.0f32, 0.0f32); FRAME_LENGTH];
    while start + FRAME_LENGTH <= samples.len() {
        for (i, value) in samples[start..start + FRAME_LENGTH].iter().enumerate() {
            buffer[i] = Complex::new(value * window[i], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..bins].iter().map(|c| c.norm()).collect());
        start += HOP_LENGTH;
    }
    trace!("STFT produced {} frames of {} bins", frames.len(), bins);
    frames
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let phase = std::f32::consts::TAU * i as f32 / (len - 1) as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Per-frame RMS intensity on a dB-like scale.
pub fn intensity_contour(samples: &[f32]) -> Vec<f32> {
    let mut contour = Vec::new();
    let mut start = 0;
    while start + FRAME_LENGTH <= samples.len() {
        let frame = &samples[start..start + FRAME_LENGTH];
        let rms = (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt();
        contour.push(20.0 * (rms + 1e-6).log10() + 96.0);
        start += HOP_LENGTH;
    }
    contour
}

/// Per-frame zero-crossing rate in [0, 1].
pub fn zero_crossing_rate(samples: &[f32]) -> Vec<f32> {
    let mut contour = Vec::new();
    let mut start = 0;
    while start + FRAME_LENGTH <= samples.len() {
        let frame = &samples[start..start + FRAME_LENGTH];
        let crossings = frame
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();
        contour.push(crossings as f32 / (frame.len() - 1) as f32);
        start += HOP_LENGTH;
    }
    contour
}

/// Spectral centroid (Hz) and bandwidth (Hz) per frame.
pub fn centroid_and_bandwidth(magnitudes: &[Vec<f32>], sample_rate: u32) -> (Vec<f32>, Vec<f32>) {
    let bins = FRAME_LENGTH / 2 + 1;
    let bin_hz = sample_rate as f32 / FRAME_LENGTH as f32;
    let freqs: Vec<f32> = (0..bins).map(|i| i as f32 * bin_hz).collect();

    let mut centroids = Vec::with_capacity(magnitudes.len());
    let mut bandwidths = Vec::with_capacity(magnitudes.len());
    for frame in magnitudes {
        let total: f32 = frame.iter().sum();
        if total <= 1e-9 {
            centroids.push(0.0);
            bandwidths.push(0.0);
            continue;
        }
        let centroid: f32 = frame
            .iter()
            .zip(&freqs)
            .map(|(m, f)| m * f)
            .sum::<f32>()
            / total;
        let variance: f32 = frame
            .iter()
            .zip(&freqs)
            .map(|(m, f)| m * (f - centroid).powi(2))
            .sum::<f32>()
            / total;
        centroids.push(centroid);
        bandwidths.push(variance.sqrt());
    }
    (centroids, bandwidths)
}

/// MFCC matrix (`N_MFCC` coefficients per frame) via a mel filterbank and
/// DCT-II over the log filterbank energies.
pub fn mfcc(magnitudes: &[Vec<f32>], sample_rate: u32) -> Vec<Vec<f32>> {
    let filterbank = mel_filterbank(sample_rate);
    magnitudes
        .iter()
        .map(|frame| {
            let energies: Vec<f32> = filterbank
                .iter()
                .map(|filter| {
                    let e: f32 = frame
                        .iter()
                        .zip(filter)
                        .map(|(m, w)| m * m * w)
                        .sum();
                    (e + 1e-10).ln()
                })
                .collect();
            dct_ii(&energies, N_MFCC)
        })
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

fn mel_filterbank(sample_rate: u32) -> Vec<Vec<f32>> {
    let bins = FRAME_LENGTH / 2 + 1;
    let fmax = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(fmax);
    let points: Vec<f32> = (0..N_MELS + 2)
        .map(|i| mel_to_hz(i as f32 * mel_max / (N_MELS + 1) as f32))
        .collect();
    let bin_hz = sample_rate as f32 / FRAME_LENGTH as f32;

    let mut filters = Vec::with_capacity(N_MELS);
    for m in 1..=N_MELS {
        let (lower, center, upper) = (points[m - 1], points[m], points[m + 1]);
        let mut filter = vec![0.0f32; bins];
        for (i, weight) in filter.iter_mut().enumerate() {
            let freq = i as f32 * bin_hz;
            if freq > lower && freq < center {
                *weight = (freq - lower) / (center - lower);
            } else if freq >= center && freq < upper {
                *weight = (upper - freq) / (upper - center);
            }
        }
        filters.push(filter);
    }
    filters
}

fn dct_ii(input: &[f32], count: usize) -> Vec<f32> {
    let n = input.len() as f32;
    (0..count)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x * (std::f32::consts::PI * k as f32 * (i as f32 + 0.5) / n).cos()
                })
                .sum()
        })
        .collect()
}

/// Onset strength per frame (positive spectral flux) and picked onset
/// frame indices.
pub fn onsets(magnitudes: &[Vec<f32>]) -> (Vec<f32>, Vec<usize>) {
    if magnitudes.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let mut strength = vec![0.0f32];
    for pair in magnitudes.windows(2) {
        let flux: f32 = pair[1]
            .iter()
            .zip(&pair[0])
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        strength.push(flux);
    }

    let picked = pick_peaks(&strength);
    (strength, picked)
}

/// Local maxima above mean + one standard deviation, at least three frames
/// apart.
fn pick_peaks(strength: &[f32]) -> Vec<usize> {
    if strength.len() < 3 {
        return Vec::new();
    }
    let mean = strength.iter().sum::<f32>() / strength.len() as f32;
    let variance =
        strength.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / strength.len() as f32;
    let threshold = mean + variance.sqrt();

    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;
    for i in 1..strength.len() - 1 {
        if strength[i] > threshold
            && strength[i] >= strength[i - 1]
            && strength[i] > strength[i + 1]
        {
            if let Some(prev) = last_peak {
                if i - prev < 3 {
                    continue;
                }
            }
            peaks.push(i);
            last_peak = Some(i);
        }
    }
    peaks
}

//! External service adapters for Vocalis.
//!
//! This module groups the adapters around the evaluation core: audio
//! probing and decoding, the transcription API client, and the lazy
//! acoustic feature extractor. Each adapter normalizes its external
//! format into the canonical types consumed by the analyzers.

pub mod audio;
pub mod features;
pub mod whisper;

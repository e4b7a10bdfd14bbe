//! Core evaluation functionality for speech analysis.
//!
//! This module contains the canonical transcript representation, the
//! analyzer framework with its registry, the text-processing helpers the
//! content analyzers share, the process-wide reference data, and the
//! aggregation layer that turns analyzer results into one report.

pub mod analyzers;
pub mod evaluation;
pub mod nlp;
pub mod reference;
pub mod transcript;

//! Typed analyzer collection with isolated, budgeted execution.
//!
//! The registry filters analyzers whose declared inputs are missing from
//! the request (they become `skipped`), then runs the remainder
//! concurrently: each analyzer on its own task, admission bounded by a
//! semaphore sized to the configured worker count, each run wrapped in a
//! wall-clock timeout. One analyzer failing, panicking, or timing out
//! never aborts the request.

use super::{Analyzer, AnalyzerResult, Feature};
use crate::core::evaluation::Artifacts;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Registry of the analyzers enabled for a deployment.
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// Registry with the full built-in analyzer set.
    pub fn with_default_analyzers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::structure::StructureAnalyzer));
        registry.register(Arc::new(super::content::ContentQualityAnalyzer));
        registry.register(Arc::new(super::disfluency::DisfluencyAnalyzer));
        registry.register(Arc::new(super::timing::TimingAnalyzer));
        registry.register(Arc::new(super::prosody::ProsodyAnalyzer));
        registry.register(Arc::new(super::pronunciation::PronunciationAnalyzer));
        registry.register(Arc::new(super::effectiveness::EffectivenessAnalyzer));
        registry
    }

    /// Add an analyzer. Results keep registration order.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Registered analyzer ids in registration order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.id()).collect()
    }

    /// Run every registered analyzer against the artifacts.
    ///
    /// Returns one result per analyzer in registration order, regardless
    /// of completion order.
    pub async fn run_all(
        &self,
        artifacts: Arc<Artifacts>,
        worker_count: usize,
        budget: Duration,
    ) -> Vec<AnalyzerResult> {
        let semaphore = Arc::new(Semaphore::new(worker_count.max(1)));
        let mut handles = Vec::with_capacity(self.analyzers.len());

        for analyzer in &self.analyzers {
            let id = analyzer.id();

            if let Some(missing) = self.missing_feature(analyzer.as_ref(), &artifacts) {
                debug!("Analyzer '{}' skipped: missing {:?}", id, missing);
                handles.push(Execution::Skipped(AnalyzerResult::skipped(
                    id,
                    &format!("required input {:?} unavailable", missing),
                )));
                continue;
            }

            let analyzer = Arc::clone(analyzer);
            let artifacts = Arc::clone(&artifacts);
            let semaphore = Arc::clone(&semaphore);
            let cancel = artifacts.cancel.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return AnalyzerResult::failed(id, "worker pool closed"),
                };
                if cancel.is_cancelled() {
                    return AnalyzerResult::failed(id, "request cancelled");
                }

                match tokio::time::timeout(budget, analyzer.analyze(&artifacts)).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => {
                        warn!("Analyzer '{}' failed: {}", id, e);
                        AnalyzerResult::failed(id, &e.to_string())
                    }
                    Err(_) => {
                        warn!("Analyzer '{}' exceeded budget of {:?}", id, budget);
                        // Feature loaders observe the cancelled token and
                        // stop producing work for this analyzer.
                        AnalyzerResult::failed(
                            id,
                            &format!("exceeded wall-clock budget of {:?}", budget),
                        )
                    }
                }
            });
            handles.push(Execution::Running(id, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for execution in handles {
            match execution {
                Execution::Skipped(result) => results.push(result),
                Execution::Running(id, handle) => match handle.await {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!("Analyzer '{}' panicked: {}", id, e);
                        results.push(AnalyzerResult::failed(id, "analyzer task panicked"));
                    }
                },
            }
        }
        results
    }

    /// First unavailable required feature, if any. Only request-level
    /// inputs make an analyzer skip; feature extraction problems are
    /// handled inside the analyzers as degradation.
    fn missing_feature(&self, analyzer: &dyn Analyzer, artifacts: &Artifacts) -> Option<Feature> {
        analyzer
            .required_features()
            .iter()
            .copied()
            .find(|feature| !Self::available(*feature, artifacts))
    }

    fn available(feature: Feature, artifacts: &Artifacts) -> bool {
        match feature {
            Feature::Topic => artifacts.metadata.topic.is_some(),
            Feature::ExpectedDuration => artifacts.metadata.expected_duration.is_some(),
            // Audio-derived features are resolved lazily; analyzers
            // degrade when extraction fails rather than being skipped.
            Feature::Transcript
            | Feature::Audio
            | Feature::Pitch
            | Feature::Intensity
            | Feature::Mfcc
            | Feature::Onsets => true,
        }
    }
}

enum Execution {
    Skipped(AnalyzerResult),
    Running(&'static str, tokio::task::JoinHandle<AnalyzerResult>),
}

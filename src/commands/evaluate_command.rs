//! The `evaluate` command: run the full pipeline on one recording.

use crate::cli::{EvaluateArgs, OutputFormat, ui};
use crate::config::ConfigService;
use crate::core::evaluation::Orchestrator;
use crate::core::reference;
use crate::services::whisper::WhisperApiTranscriber;
use crate::{Result, error::VocalisError};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Execute the evaluate command with an injected configuration service.
pub async fn execute_with_config(
    args: EvaluateArgs,
    config_service: Arc<dyn ConfigService>,
) -> Result<()> {
    let config = config_service.get_config()?;

    // Reference data loads once per process, from the configured
    // directory or a `reference-data` directory next to the config file.
    let reference_dir = match &config.analysis.reference_data_dir {
        Some(dir) => dir.clone(),
        None => config_service
            .get_config_file_path()?
            .parent()
            .map(|p| p.join("reference-data"))
            .unwrap_or_else(|| PathBuf::from("reference-data")),
    };
    debug!("Using reference data directory {:?}", reference_dir);
    reference::init_reference_data(&reference_dir);

    let api_key = config.transcriber.api_key.clone().ok_or_else(|| {
        VocalisError::config(
            "no transcription API key configured; set transcriber.api_key or OPENAI_API_KEY",
        )
    })?;
    let transcriber = Arc::new(WhisperApiTranscriber::new(
        api_key,
        config.transcriber.base_url.clone(),
        config.transcriber.clone(),
    )?);

    let quiet = args.output == OutputFormat::Json;
    let spinner = if quiet {
        None
    } else {
        Some(ui::create_progress_spinner("Transcribing and analyzing..."))
    };

    let orchestrator = Orchestrator::new(config, transcriber);
    let result = orchestrator.evaluate(args.to_request()).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            ui::display_report(&report);
        }
    }
    Ok(())
}

//! Command-line interface for the Vocalis speech evaluation tool.
//!
//! This module provides the top-level CLI application structure and
//! subcommands for running evaluations, managing configuration, and
//! generating shell completions.
//!
//! # Architecture
//!
//! The CLI is built using `clap` and follows a subcommand pattern:
//! - `evaluate` - Transcribe and score one spoken-audio recording
//! - `config` - Configuration management and inspection
//! - `generate-completion` - Shell completion script generation
//!
//! # Examples
//!
//! ```bash
//! # Evaluate a prepared speech against its topic and time window
//! vocalis-cli evaluate talk.wav --topic "Renewable energy" \
//!     --expected-duration "5-7 minutes" --speech-type "Prepared Speech"
//!
//! # Machine-readable output
//! vocalis-cli evaluate talk.wav --topic "Renewable energy" --output json
//!
//! # Inspect the active configuration
//! vocalis-cli config list
//! ```

mod config_args;
mod evaluate_args;
mod generate_completion_args;
pub mod ui;

use clap::{Parser, Subcommand};
pub use config_args::{ConfigAction, ConfigArgs};
pub use evaluate_args::{EvaluateArgs, OutputFormat};
pub use generate_completion_args::GenerateCompletionArgs;
pub use ui::{create_progress_spinner, print_error, print_success, print_warning};

/// Main CLI application structure defining the top-level interface.
#[derive(Parser, Debug)]
#[command(name = "vocalis-cli")]
#[command(about = "AI speech evaluation CLI tool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the Vocalis CLI application.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe and score a spoken-audio recording
    Evaluate(EvaluateArgs),

    /// Manage and inspect application configuration
    Config(ConfigArgs),

    /// Generate shell completion scripts
    GenerateCompletion(GenerateCompletionArgs),
}

/// Executes the Vocalis CLI application with parsed arguments.
///
/// This is the main entry point for CLI execution, routing parsed
/// command-line arguments to their respective command handlers through
/// the dispatcher with the process-wide configuration service.
pub async fn run() -> crate::Result<()> {
    let cli = Cli::parse();
    let config_service = crate::config::config_service()?;
    crate::commands::dispatcher::dispatch_command(cli.command, config_service).await
}

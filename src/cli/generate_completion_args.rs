// src/cli/generate_completion_args.rs
use clap::Args;
use clap_complete::Shell;

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct GenerateCompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

//! Central command dispatcher.
//!
//! Routes parsed CLI commands to their handlers with the configuration
//! service injected, so the binary and any embedding code share one
//! execution path.

use crate::{Result, cli::Commands, config::ConfigService};
use std::sync::Arc;

/// Dispatch one parsed command.
pub async fn dispatch_command(
    command: Commands,
    config_service: Arc<dyn ConfigService>,
) -> Result<()> {
    match command {
        Commands::Evaluate(args) => {
            crate::commands::evaluate_command::execute_with_config(args, config_service).await
        }
        Commands::Config(args) => {
            crate::commands::config_command::execute_with_config(args, config_service).await
        }
        Commands::GenerateCompletion(args) => {
            let mut cmd = <crate::cli::Cli as clap::CommandFactory>::command();
            let cmd_name = cmd.get_name().to_string();
            let mut stdout = std::io::stdout();
            clap_complete::generate(args.shell, &mut cmd, cmd_name, &mut stdout);
            Ok(())
        }
    }
}

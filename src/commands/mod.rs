//! Command handlers for the Vocalis CLI.
//!
//! Each submodule executes one CLI subcommand against an injected
//! [`ConfigService`](crate::config::ConfigService); the dispatcher routes
//! parsed arguments here so the CLI and library entry points share one
//! execution path.

pub mod config_command;
pub mod dispatcher;
pub mod evaluate_command;

//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod render;
mod run;
mod template;

pub use render::RenderArgs;
pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;
use std::process::ExitCode;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a build job remotely and stream its logs
    Run(RunArgs),
    /// Print the job stack template rendered for the given variables
    Render(RenderArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// The process exit code
pub async fn handle_command(command: Commands, config: &Config) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => run::handle_run_command(args, config).await,
        Commands::Render(args) => render::handle_render_command(args),
    }
}

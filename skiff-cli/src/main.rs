//! Skiff CLI
//!
//! Command-line interface that runs one build job on ephemeral remote
//! infrastructure and streams its logs.

mod commands;
mod config;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "Run build jobs on ephemeral remote infrastructure", long_about = None)]
struct Cli {
    /// Control-plane gateway URL
    #[arg(long, global = true, env = "SKIFF_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Base stack providing the cluster and network
    #[arg(long, global = true, env = "SKIFF_BASE_STACK")]
    base_stack: Option<String>,

    /// Backend region, enables a console link to the job's logs
    #[arg(long, global = true, env = "SKIFF_REGION")]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so task output and rendered templates own stdout
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skiff=info,skiff_runner=info,skiff_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.gateway_url, cli.base_stack, cli.region)?;

    handle_command(cli.command, &config).await
}

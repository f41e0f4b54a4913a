//! Run command handler
//!
//! Runs one build job end to end and maps its outcome to the process
//! exit code.

use anyhow::Result;
use clap::Args;
use colored::*;
use skiff_client::GatewayClient;
use skiff_core::domain::job::{JobIdentity, JobRequest};
use skiff_core::domain::stack::StackSet;
use skiff_core::domain::variable::{EnvironmentVariable, Secret};
use skiff_runner::{Backends, JobController, LogSink, StdoutLogSink, TracingLogSink};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::template::TemplateArgs;
use crate::config::Config;
use crate::types::{parse_secret, parse_variable, validate_build_id};

/// Arguments of `skiff run`
#[derive(Args)]
pub struct RunArgs {
    /// Container image to run
    #[arg(long)]
    image: String,

    /// Container entrypoint, comma separated
    #[arg(long, value_delimiter = ',', default_value = "/bin/sh")]
    entrypoint: Vec<String>,

    /// Command element (repeatable), e.g. `--command=-c --command "make build"`
    #[arg(long = "command", allow_hyphen_values = true)]
    commands: Vec<String>,

    /// Where shared storage is mounted in the container
    #[arg(long, default_value = "/efsdata")]
    mount_dir: String,

    /// Working directory of the container
    #[arg(long, default_value = "/efsdata/")]
    working_dir: String,

    /// Environment variable, KEY=VALUE (repeatable)
    #[arg(short, long = "env", value_parser = parse_variable)]
    env: Vec<EnvironmentVariable>,

    /// Secret, KEY=VALUE or KEY:ENV_NAME=VALUE (repeatable)
    #[arg(short, long = "secret", value_parser = parse_secret)]
    secrets: Vec<Secret>,

    /// Build id, generated when absent
    #[arg(long, env = "SKIFF_BUILD_ID")]
    build_id: Option<String>,

    /// Send task output through the logger instead of stdout
    #[arg(long)]
    log_lines: bool,

    /// Prefix task output with the time each line was logged
    #[arg(long)]
    timestamps: bool,

    #[command(flatten)]
    template: TemplateArgs,
}

/// Run a build job
pub async fn handle_run_command(args: RunArgs, config: &Config) -> Result<ExitCode> {
    config.runner.validate()?;
    let templates = args.template.load()?;

    let identity = match &args.build_id {
        Some(id) => {
            validate_build_id(id).map_err(anyhow::Error::msg)?;
            JobIdentity::new(id.clone())
        }
        None => JobIdentity::generate(),
    };

    let request = JobRequest {
        image: args.image,
        entrypoint: args.entrypoint,
        commands: args.commands,
        mount_dir: args.mount_dir,
        working_dir: args.working_dir,
        environment: args.env,
        secrets: args.secrets,
    };

    println!(
        "{} {} {}",
        "Build".bold(),
        identity.build_id.cyan(),
        format!("({})", request.image).dimmed()
    );

    let stacks = StackSet::for_job(&config.runner.base_stack, &identity.build_id);
    if let Some(link) = config.runner.console_link(stacks.main.as_str()) {
        println!("{} {}", "Logs".bold(), link.dimmed());
    }

    let client = GatewayClient::new(config.runner.gateway_url.clone());
    let controller = JobController::new(Backends::gateway(client), templates, &config.runner);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the job and cleaning up");
            on_interrupt.cancel();
        }
    });

    let mut sink: Box<dyn LogSink> = if args.log_lines {
        Box::new(TracingLogSink)
    } else {
        Box::new(StdoutLogSink::new(args.timestamps))
    };

    match controller
        .run(&identity, &request, sink.as_mut(), &cancel)
        .await
    {
        Ok(()) => {
            println!(
                "{}",
                format!("✓ Build {} succeeded", identity.build_id)
                    .green()
                    .bold()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!(
                "{} {}",
                "✗".red().bold(),
                format!(
                    "Build {} failed during {}: {}",
                    identity.build_id,
                    failure.stage(),
                    failure
                )
                .red()
            );
            Ok(ExitCode::from(exit_status(failure.exit_code())))
        }
    }
}

/// Fits an exit code into a process status, non-zero whatever the input
fn exit_status(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(0) | Err(_) => 1,
        Ok(status) => status,
    }
}

//! Render command handler
//!
//! Prints the job stack template exactly as it would be submitted.

use anyhow::Result;
use clap::Args;
use colored::*;
use skiff_core::domain::variable::{EnvironmentVariable, Secret};
use skiff_template::render;
use std::process::ExitCode;

use super::template::TemplateArgs;
use crate::types::{parse_secret, parse_variable};

/// Arguments of `skiff render`
#[derive(Args)]
pub struct RenderArgs {
    /// Environment variable, KEY=VALUE (repeatable)
    #[arg(short, long = "env", value_parser = parse_variable)]
    env: Vec<EnvironmentVariable>,

    /// Secret, KEY=VALUE or KEY:ENV_NAME=VALUE (repeatable)
    #[arg(short, long = "secret", value_parser = parse_secret)]
    secrets: Vec<Secret>,

    #[command(flatten)]
    template: TemplateArgs,
}

/// Render the job template and print it
pub fn handle_render_command(args: RenderArgs) -> Result<ExitCode> {
    let templates = args.template.load()?;

    match render(&templates.main, &args.secrets, &args.env) {
        Ok(rendered) => {
            print!("{}", rendered);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e.to_string().red());
            Ok(ExitCode::FAILURE)
        }
    }
}

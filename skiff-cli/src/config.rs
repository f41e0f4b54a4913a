//! Configuration module
//!
//! Builds the runner configuration from `SKIFF_*` environment variables and
//! applies command-line overrides on top.

use anyhow::{Context, Result};
use skiff_runner::RunnerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings of the job runner
    pub runner: RunnerConfig,
}

impl Config {
    /// Loads the environment, then applies flags that were given
    pub fn load(
        gateway_url: Option<String>,
        base_stack: Option<String>,
        region: Option<String>,
    ) -> Result<Self> {
        let mut runner =
            RunnerConfig::from_env().context("Failed to read SKIFF_* environment variables")?;

        if let Some(url) = gateway_url {
            runner.gateway_url = url;
        }
        if let Some(stack) = base_stack {
            runner.base_stack = stack;
        }
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            runner.region = Some(region);
        }

        Ok(Self { runner })
    }
}

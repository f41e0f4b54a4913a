//! Template selection shared by commands

use anyhow::{Context, Result};
use clap::Args;
use skiff_runner::Templates;
use std::fs;
use std::path::PathBuf;

/// Options selecting the job stack template
#[derive(Args)]
pub struct TemplateArgs {
    /// Job stack template to use instead of the bundled one
    #[arg(long, env = "SKIFF_TEMPLATE")]
    pub template: Option<PathBuf>,
}

impl TemplateArgs {
    /// Bundled templates, with the job template replaced if one was given
    pub fn load(&self) -> Result<Templates> {
        let templates = Templates::default();
        match &self.template {
            Some(path) => {
                let main = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template {}", path.display()))?;
                Ok(templates.with_main(main))
            }
            None => Ok(templates),
        }
    }
}

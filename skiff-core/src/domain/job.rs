//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::variable::{EnvironmentVariable, Secret};

/// Identity of a single remote build job
///
/// The sentinel is echoed by the task once its commands finish and is
/// searched for in the log stream to detect the definitive end of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdentity {
    pub build_id: String,
    pub sentinel: String,
}

impl JobIdentity {
    /// Creates an identity for a caller-chosen build id with a fresh sentinel
    pub fn new(build_id: impl Into<String>) -> Self {
        Self {
            build_id: build_id.into(),
            sentinel: Uuid::new_v4().simple().to_string(),
        }
    }

    /// Creates an identity with a generated build id
    pub fn generate() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self::new(&id[..12])
    }
}

/// Everything needed to run one build job remotely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub image: String,
    pub entrypoint: Vec<String>,
    pub commands: Vec<String>,
    pub mount_dir: String,
    pub working_dir: String,
    #[serde(default)]
    pub environment: Vec<EnvironmentVariable>,
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

impl JobRequest {
    /// Command list with an `echo` of the sentinel appended to the last command
    ///
    /// Commands are usually `["-c", "<script>"]` for a shell entrypoint, so
    /// the echo runs after the script body.
    pub fn commands_with_sentinel(&self, sentinel: &str) -> Vec<String> {
        let mut commands = self.commands.clone();
        let echo = format!("echo \"{}\"", sentinel);
        match commands.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(&echo);
            }
            None => commands.push(echo),
        }
        commands
    }
}

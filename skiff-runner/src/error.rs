//! Job failure taxonomy

use skiff_template::TemplateError;
use thiserror::Error;

/// Result type alias for lifecycle stages
pub type Result<T> = std::result::Result<T, JobFailure>;

/// Terminal reason a job did not succeed
///
/// Cleanup failures never show up here; they are logged as warnings.
#[derive(Debug, Error)]
pub enum JobFailure {
    /// The job template could not be rendered; nothing was submitted
    #[error("template rendering failed: {0}")]
    Template(#[from] TemplateError),

    /// A stack could not be submitted or described
    #[error("provisioning failed: {0}")]
    Provisioning(String),

    /// A resource a stage needs was not found in the stacks
    #[error("resource handle not resolved: {0}")]
    UnresolvedHandle(String),

    /// The task never reached the running state
    #[error("task failed to start: {reason} (last container status: {last_status})")]
    Launch { reason: String, last_status: String },

    /// The task finished with a non-zero exit code
    #[error("task exited with code {exit_code}")]
    Execution { exit_code: i32 },

    /// The task finished but its exit code could not be read
    #[error("task exit code unavailable: {0}")]
    ExitCodeUnavailable(String),

    /// The log stream backend failed
    #[error("log tailing failed: {0}")]
    Tail(String),

    /// The run was cancelled
    #[error("job cancelled")]
    Cancelled,
}

/// Teardown steps that did not complete
///
/// Only ever logged; a job's outcome never depends on it.
#[derive(Debug, Error)]
#[error("teardown incomplete: {}", .0.join("; "))]
pub struct TeardownError(pub Vec<String>);

impl JobFailure {
    /// Process exit code to report for this failure
    ///
    /// A task's own non-zero exit code is passed through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Execution { exit_code } if *exit_code != 0 => *exit_code,
            Self::Cancelled => 130,
            _ => 1,
        }
    }

    /// Stage that failed, for progress output
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Template(_) => "parameterize",
            Self::Provisioning(_) | Self::UnresolvedHandle(_) => "provision",
            Self::Launch { .. } => "launch",
            Self::Tail(_) | Self::Cancelled => "tail",
            Self::Execution { .. } | Self::ExitCodeUnavailable(_) => "finish",
        }
    }
}

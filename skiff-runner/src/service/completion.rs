//! Completion service
//!
//! Waits for the task to stop and turns its exit code into the job outcome.

use skiff_client::TaskRunner;
use skiff_core::domain::stack::TaskDef;
use skiff_core::domain::task::TaskHandle;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{JobFailure, Result};
use crate::service::cleanup::Cleanup;

/// Reconciles the task's exit status
pub struct CompletionService {
    tasks: Arc<dyn TaskRunner>,
}

impl CompletionService {
    pub fn new(tasks: Arc<dyn TaskRunner>) -> Self {
        Self { tasks }
    }

    /// Waits for the task to stop and checks its exit code
    ///
    /// On failure the stacks are torn down before returning; on success
    /// teardown is left to the caller.
    ///
    /// # Errors
    /// Returns [`JobFailure::Execution`] for a non-zero exit code and
    /// [`JobFailure::ExitCodeUnavailable`] if no exit code was reported.
    pub async fn finish(
        &self,
        task_def: &TaskDef,
        task: &TaskHandle,
        cleanup: &Cleanup<'_>,
    ) -> Result<()> {
        let cluster = task_def.handles.cluster.as_str();

        if let Err(e) = self
            .tasks
            .wait_stopped(cluster, std::slice::from_ref(task))
            .await
        {
            warn!("Waiting for task {} to stop failed: {}", task, e);
        }

        match self.exit_code(cluster, task).await {
            Ok(0) => {
                info!("Task {} finished successfully", task);
                Ok(())
            }
            Ok(exit_code) => {
                error!("Task {} exited with code {}", task, exit_code);
                cleanup.run_once().await;
                Err(JobFailure::Execution { exit_code })
            }
            Err(reason) => {
                error!("No exit code for task {}: {}", task, reason);
                cleanup.run_once().await;
                Err(JobFailure::ExitCodeUnavailable(reason))
            }
        }
    }

    async fn exit_code(&self, cluster: &str, task: &TaskHandle) -> std::result::Result<i32, String> {
        let descriptions = self
            .tasks
            .describe_tasks(cluster, std::slice::from_ref(task))
            .await
            .map_err(|e| format!("failed to describe task: {}", e))?;

        let description = descriptions
            .into_iter()
            .find(|d| &d.task == task)
            .ok_or_else(|| "task not found".to_string())?;

        description
            .primary_container()
            .and_then(|c| c.exit_code)
            .ok_or_else(|| format!("container reported no exit code ({})", description.last_status))
    }
}

//! Task launcher
//!
//! Starts the job's single task on the resolved cluster and waits for it to
//! reach the running state.

use skiff_client::TaskRunner;
use skiff_core::domain::job::JobIdentity;
use skiff_core::domain::stack::TaskDef;
use skiff_core::domain::task::TaskHandle;
use skiff_core::domain::variable::EnvironmentVariable;
use skiff_core::dto::task::{ContainerOverride, LaunchType, NetworkConfiguration, RunTask};
use skiff_template::parameters;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{JobFailure, Result};

/// Runtime platform the task is pinned to
pub const PLATFORM_VERSION: &str = "1.4.0";

/// Launches the job's task
pub struct TaskLauncher {
    tasks: Arc<dyn TaskRunner>,
    retry_delay: Duration,
}

impl TaskLauncher {
    /// Creates a new task launcher
    ///
    /// # Arguments
    /// * `tasks` - The task runner backend
    /// * `retry_delay` - Pause before re-describing a task that did not start
    pub fn new(tasks: Arc<dyn TaskRunner>, retry_delay: Duration) -> Self {
        Self { tasks, retry_delay }
    }

    /// Starts one task and waits until it runs
    ///
    /// # Returns
    /// The handle of the running task
    ///
    /// # Errors
    /// Returns [`JobFailure::UnresolvedHandle`] if the cluster, task
    /// definition, subnets or security group were not resolved, and
    /// [`JobFailure::Launch`] if the task does not start.
    pub async fn launch(
        &self,
        task_def: &TaskDef,
        environment: &[EnvironmentVariable],
        identity: &JobIdentity,
    ) -> Result<TaskHandle> {
        let missing = task_def.handles.missing_for_launch();
        if !missing.is_empty() {
            return Err(JobFailure::UnresolvedHandle(missing.join(", ")));
        }

        let cluster = task_def.handles.cluster.as_str();
        let request = run_request(task_def, environment, identity);

        let task = self
            .tasks
            .run(request)
            .await
            .map_err(|e| JobFailure::Launch {
                reason: e.to_string(),
                last_status: "not started".to_string(),
            })?
            .into_iter()
            .next()
            .ok_or_else(|| JobFailure::Launch {
                reason: "no task was started".to_string(),
                last_status: "not started".to_string(),
            })?;

        info!("Task {} started on cluster {}", task, cluster);

        if let Err(e) = self
            .tasks
            .wait_running(cluster, std::slice::from_ref(&task))
            .await
        {
            tokio::time::sleep(self.retry_delay).await;
            let last_status = self.last_container_status(cluster, &task).await;
            error!(
                "Task {} did not reach running, last container status: {}",
                task, last_status
            );
            return Err(JobFailure::Launch {
                reason: e.to_string(),
                last_status,
            });
        }

        info!("Task {} is running", task);
        Ok(task)
    }

    async fn last_container_status(&self, cluster: &str, task: &TaskHandle) -> String {
        match self
            .tasks
            .describe_tasks(cluster, std::slice::from_ref(task))
            .await
        {
            Ok(descriptions) => descriptions
                .iter()
                .find(|d| &d.task == task)
                .and_then(|d| d.primary_container())
                .and_then(|c| c.last_status.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            Err(e) => {
                warn!("Failed to describe task {}: {}", task, e);
                "unknown".to_string()
            }
        }
    }
}

fn run_request(
    task_def: &TaskDef,
    environment: &[EnvironmentVariable],
    identity: &JobIdentity,
) -> RunTask {
    let mut variables = environment.to_vec();
    variables.push(EnvironmentVariable::new(
        parameters::BUILD_ID,
        &identity.build_id,
    ));

    RunTask {
        cluster: task_def.handles.cluster.clone(),
        task_definition: task_def.handles.task_definition.clone(),
        launch_type: LaunchType::Fargate,
        platform_version: PLATFORM_VERSION.to_string(),
        overrides: vec![ContainerOverride {
            name: task_def.stacks.main.name.clone(),
            environment: variables,
        }],
        network: NetworkConfiguration {
            subnets: vec![
                task_def.handles.subnet_one.clone(),
                task_def.handles.subnet_two.clone(),
            ],
            security_groups: vec![task_def.handles.security_group.clone()],
            assign_public_ip: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeBackend, MAIN_STACK};
    use tokio::time::Instant;

    fn launcher(fake: &Arc<FakeBackend>) -> TaskLauncher {
        TaskLauncher::new(fake.clone(), Duration::from_secs(3))
    }

    #[tokio::test]
    async fn test_launch_runs_one_task() {
        let fake = Arc::new(FakeBackend::new());

        let task = launcher(&fake)
            .launch(
                &testing::task_def(),
                &testing::request().environment,
                &testing::identity(),
            )
            .await
            .unwrap();

        assert_eq!(task.as_str(), "task-1");
        assert_eq!(fake.calls(), vec!["run", "wait_running"]);

        let state = fake.state();
        let run = &state.runs[0];
        assert_eq!(run.cluster, "cluster-1");
        assert_eq!(run.task_definition, "task-def-1");
        assert_eq!(run.launch_type, LaunchType::Fargate);
        assert_eq!(run.platform_version, "1.4.0");
        assert_eq!(run.network.subnets, vec!["subnet-1", "subnet-2"]);
        assert_eq!(run.network.security_groups, vec!["sg-1"]);
        assert!(run.network.assign_public_ip);

        let container = &run.overrides[0];
        assert_eq!(container.name, MAIN_STACK);
        assert_eq!(
            container.environment,
            vec![
                EnvironmentVariable::new("FOO", "bar"),
                EnvironmentVariable::new("BUILDID", "job1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unresolved_cluster_is_not_launched() {
        let fake = Arc::new(FakeBackend::new());
        let mut task_def = testing::task_def();
        task_def.handles.cluster.clear();
        task_def.handles.security_group.clear();

        let result = launcher(&fake)
            .launch(&task_def, &[], &testing::identity())
            .await;

        match result {
            Err(JobFailure::UnresolvedHandle(names)) => {
                assert_eq!(names, "ECSCluster, ContainerSecurityGroup")
            }
            other => panic!("expected unresolved handle, got {:?}", other),
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_failure_redescribes_once_after_delay() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.fail_wait_running = true;
            s.container_status = Some("STOPPED".to_string());
        }));
        let start = Instant::now();

        let result = launcher(&fake)
            .launch(&testing::task_def(), &[], &testing::identity())
            .await;

        assert!(start.elapsed() >= Duration::from_secs(3));
        match result {
            Err(JobFailure::Launch { last_status, .. }) => assert_eq!(last_status, "STOPPED"),
            other => panic!("expected launch failure, got {:?}", other),
        }
        assert_eq!(fake.calls(), vec!["run", "wait_running", "describe_tasks"]);
    }
}

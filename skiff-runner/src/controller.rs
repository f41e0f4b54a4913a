//! Job lifecycle controller
//!
//! Runs one job through every stage, in order:
//! parameterize and provision, launch, tail, finish, teardown.
//! Each stage needs the previous stage's output, so nothing runs in parallel.
//! Teardown runs exactly once, whichever stage failed.

use skiff_client::{GatewayClient, LogStream, StackOrchestrator, TaskRunner};
use skiff_core::domain::job::{JobIdentity, JobRequest};
use skiff_core::domain::stack::StackSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::RunnerConfig;
use crate::error::{JobFailure, Result};
use crate::service::{Cleanup, CompletionService, LogTailer, StackService, TaskLauncher};
use crate::sinks::LogSink;
use crate::templates::Templates;

/// Backends a job talks to
#[derive(Clone)]
pub struct Backends {
    pub stacks: Arc<dyn StackOrchestrator>,
    pub tasks: Arc<dyn TaskRunner>,
    pub logs: Arc<dyn LogStream>,
}

impl Backends {
    /// All three backends served by one gateway
    pub fn gateway(client: GatewayClient) -> Self {
        let client = Arc::new(client);
        Self {
            stacks: client.clone(),
            tasks: client.clone(),
            logs: client,
        }
    }
}

/// Runs remote build jobs
pub struct JobController {
    stacks: StackService,
    launcher: TaskLauncher,
    tailer: LogTailer,
    completion: CompletionService,
}

impl JobController {
    /// Creates a new job controller
    ///
    /// # Arguments
    /// * `backends` - Stack, task and log stream backends
    /// * `templates` - Job and failsafe stack templates
    /// * `config` - Runner configuration
    pub fn new(backends: Backends, templates: Templates, config: &RunnerConfig) -> Self {
        Self {
            stacks: StackService::new(backends.stacks.clone(), templates, config),
            launcher: TaskLauncher::new(backends.tasks.clone(), config.launch_retry_delay),
            tailer: LogTailer::new(
                backends.logs,
                backends.tasks.clone(),
                backends.stacks,
                config.poll_interval,
                config.stop_grace,
                config.region.clone(),
            ),
            completion: CompletionService::new(backends.tasks),
        }
    }

    /// Runs one job to completion and tears down what it provisioned
    ///
    /// # Arguments
    /// * `identity` - Build id and sentinel of the job
    /// * `request` - Image, commands, variables and secrets
    /// * `sink` - Receives the task's log lines
    /// * `cancel` - Stops the job before launch or while tailing
    ///
    /// # Errors
    /// Returns the [`JobFailure`] of the first stage that failed. Teardown
    /// problems are logged and never returned.
    pub async fn run(
        &self,
        identity: &JobIdentity,
        request: &JobRequest,
        sink: &mut dyn LogSink,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let stacks = self.stacks.stack_set(identity);
        info!(
            "Starting job {} on base stack {}",
            identity.build_id, stacks.base
        );

        let cleanup = Cleanup::new(&self.stacks, &stacks);
        let result = self
            .run_stages(&stacks, identity, request, sink, cancel, &cleanup)
            .await;

        if let Err(e) = &result {
            error!(stage = e.stage(), "Job {} failed: {}", identity.build_id, e);
        }

        cleanup.run_once().await;

        if result.is_ok() {
            info!("Job {} succeeded", identity.build_id);
        }
        result
    }

    async fn run_stages(
        &self,
        stacks: &StackSet,
        identity: &JobIdentity,
        request: &JobRequest,
        sink: &mut dyn LogSink,
        cancel: &CancellationToken,
        cleanup: &Cleanup<'_>,
    ) -> Result<()> {
        let task_def = self.stacks.provision(stacks, identity, request).await?;

        if cancel.is_cancelled() {
            return Err(JobFailure::Cancelled);
        }

        let task = self
            .launcher
            .launch(&task_def, &request.environment, identity)
            .await?;

        let outcome = self.tailer.tail(&task, &task_def, sink, cancel).await?;
        debug!("Tailing ended: {:?}", outcome);

        self.completion.finish(&task_def, &task, cleanup).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, CollectingSink, FakeBackend, data_batch};
    use skiff_core::domain::task::TaskStatus;

    fn controller(fake: &Arc<FakeBackend>) -> JobController {
        JobController::new(fake.backends(), Templates::default(), &RunnerConfig::default())
    }

    async fn run(fake: &Arc<FakeBackend>, sink: &mut CollectingSink) -> Result<()> {
        controller(fake)
            .run(
                &testing::identity(),
                &testing::request(),
                sink,
                &CancellationToken::new(),
            )
            .await
    }

    /// Number of deletion requests for the job stack
    fn teardowns(fake: &FakeBackend) -> usize {
        let main = format!("delete:{}", testing::MAIN_STACK);
        fake.calls().iter().filter(|c| **c == main).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_job() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.batches.push_back(data_batch(&["hello from the task", testing::SENTINEL]));
        }));
        let mut sink = CollectingSink::default();

        run(&fake, &mut sink).await.unwrap();

        assert_eq!(sink.lines, vec!["hello from the task"]);
        assert_eq!(teardowns(&fake), 1);

        let calls = fake.calls();
        let stopped = calls.iter().position(|c| c == "wait_stopped").unwrap();
        let deleted = calls.iter().position(|c| c.starts_with("delete:")).unwrap();
        assert!(stopped < deleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_is_torn_down_once() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.exit_code = Some(137);
            s.batches.push_back(data_batch(&[testing::SENTINEL]));
        }));

        let result = run(&fake, &mut CollectingSink::default()).await;

        assert!(matches!(result, Err(JobFailure::Execution { exit_code: 137 })));
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_skips_tailing() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.fail_wait_running = true;
            s.container_status = Some("STOPPED".to_string());
        }));

        let result = run(&fake, &mut CollectingSink::default()).await;

        assert!(matches!(result, Err(JobFailure::Launch { .. })));
        assert_eq!(fake.count("describe_tasks"), 1);
        assert_eq!(fake.count("describe_stream"), 0);
        assert_eq!(fake.count("get_records"), 0);
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test]
    async fn test_template_failure_still_tears_down() {
        let fake = Arc::new(FakeBackend::new());
        let controller = JobController::new(
            fake.backends(),
            Templates::default().with_main("Resources: {}\n"),
            &RunnerConfig::default(),
        );

        let result = controller
            .run(
                &testing::identity(),
                &testing::request(),
                &mut CollectingSink::default(),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(JobFailure::Template(_))));
        assert_eq!(fake.count("submit"), 0);
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test]
    async fn test_failsafe_submit_failure_tears_down_both_stacks() {
        let fake = Arc::new(
            FakeBackend::new().with(|s| s.reject_stack = Some(testing::FAILSAFE_STACK.to_string())),
        );

        let result = run(&fake, &mut CollectingSink::default()).await;

        assert!(matches!(result, Err(JobFailure::Provisioning(_))));
        assert_eq!(fake.count("submit"), 2);
        assert_eq!(fake.count("run"), 0);
        assert_eq!(teardowns(&fake), 1);
        assert_eq!(
            fake.count(&format!("delete:{}", testing::FAILSAFE_STACK)),
            1
        );
    }

    #[tokio::test]
    async fn test_unresolved_cluster_fails_before_launch() {
        let fake = Arc::new(FakeBackend::new().with(|s| s.base_resources.clear()));

        let result = run(&fake, &mut CollectingSink::default()).await;

        assert!(matches!(result, Err(JobFailure::UnresolvedHandle(_))));
        assert_eq!(fake.count("run"), 0);
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tail_failure_is_torn_down_once() {
        let fake = Arc::new(FakeBackend::new().with(|s| s.fail_records = true));

        let result = run(&fake, &mut CollectingSink::default()).await;

        assert!(matches!(result, Err(JobFailure::Tail(_))));
        assert_eq!(fake.count("wait_stopped"), 0);
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_launch() {
        let fake = Arc::new(FakeBackend::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = controller(&fake)
            .run(
                &testing::identity(),
                &testing::request(),
                &mut CollectingSink::default(),
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(JobFailure::Cancelled)));
        assert_eq!(fake.count("run"), 0);
        assert_eq!(teardowns(&fake), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_without_sentinel_ends_after_grace() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.statuses = [TaskStatus::Running, TaskStatus::Stopped].into();
            s.batches.push_back(data_batch(&["partial output"]));
        }));
        let mut sink = CollectingSink::default();

        run(&fake, &mut sink).await.unwrap();

        assert_eq!(sink.lines, vec!["partial output"]);
        assert_eq!(teardowns(&fake), 1);
    }
}

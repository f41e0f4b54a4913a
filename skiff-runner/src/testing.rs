//! In-memory backends for lifecycle tests
//!
//! One [`FakeBackend`] plays all three backends and records every call in
//! order, so tests can assert on the exact sequence a job produced.

use async_trait::async_trait;
use serde_json::json;
use skiff_client::{ClientError, LogStream, Result, StackOrchestrator, TaskRunner};
use skiff_core::domain::job::{JobIdentity, JobRequest};
use skiff_core::domain::log::LogEvent;
use skiff_core::domain::stack::{ResourceHandles, StackSet, TaskDef, logical_id};
use skiff_core::domain::task::{TaskHandle, TaskStatus};
use skiff_core::domain::variable::EnvironmentVariable;
use skiff_core::dto::stack::{StackResource, SubmitStack};
use skiff_core::dto::stream::{
    IteratorPosition, Record, RecordBatch, Shard, ShardIterator, StreamDescription,
};
use skiff_core::dto::task::{ContainerDescription, RunTask, TaskDescription};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::controller::Backends;
use crate::decode::encode_batch;
use crate::sinks::LogSink;

pub const BASE_STACK: &str = "game-ci";
pub const BUILD_ID: &str = "job1";
pub const SENTINEL: &str = "sentinel-0f3a";
pub const MAIN_STACK: &str = "game-ci-job1";
pub const FAILSAFE_STACK: &str = "game-ci-job1-cleanup";

/// Scripted behaviour and recorded calls
#[derive(Debug)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub submitted: Vec<SubmitStack>,
    pub runs: Vec<RunTask>,
    pub base_resources: Vec<StackResource>,
    pub job_resources: Vec<StackResource>,
    pub fail_submit: bool,
    /// Only this stack's submission is rejected
    pub reject_stack: Option<String>,
    pub fail_wait_ready: bool,
    pub fail_wait_running: bool,
    pub fail_delete: bool,
    /// Successive task statuses; the last one repeats
    pub statuses: VecDeque<TaskStatus>,
    pub container_status: Option<String>,
    pub exit_code: Option<i32>,
    pub shards: Vec<Shard>,
    /// Successive record batches; an idle batch is served once drained
    pub batches: VecDeque<RecordBatch>,
    pub fail_records: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            submitted: Vec::new(),
            runs: Vec::new(),
            base_resources: vec![
                StackResource::new(logical_id::CLUSTER, "cluster-1"),
                StackResource::new(logical_id::SUBNET_ONE, "subnet-1"),
                StackResource::new(logical_id::SUBNET_TWO, "subnet-2"),
                StackResource::new(logical_id::SECURITY_GROUP, "sg-1"),
            ],
            job_resources: vec![
                StackResource::new(logical_id::TASK_DEFINITION, "task-def-1"),
                StackResource::new(logical_id::LOG_STREAM, "stream-1"),
            ],
            fail_submit: false,
            reject_stack: None,
            fail_wait_ready: false,
            fail_wait_running: false,
            fail_delete: false,
            statuses: VecDeque::from([TaskStatus::Running]),
            container_status: Some("RUNNING".to_string()),
            exit_code: Some(0),
            shards: vec![Shard {
                id: "shard-0".to_string(),
            }],
            batches: VecDeque::new(),
            fail_records: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjusts the scripted behaviour
    pub fn with(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }

    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            stacks: self.clone(),
            tasks: self.clone(),
            logs: self.clone(),
        }
    }
}

#[async_trait]
impl StackOrchestrator for FakeBackend {
    async fn submit(&self, request: SubmitStack) -> Result<()> {
        self.record(format!("submit:{}", request.name));
        let mut state = self.state();
        if state.fail_submit || state.reject_stack.as_deref() == Some(request.name.as_str()) {
            return Err(ClientError::api_error(400, "template rejected"));
        }
        state.submitted.push(request);
        Ok(())
    }

    async fn describe_resources(&self, stack: &str) -> Result<Vec<StackResource>> {
        self.record(format!("describe_resources:{}", stack));
        let state = self.state();
        if stack == BASE_STACK {
            Ok(state.base_resources.clone())
        } else {
            Ok(state.job_resources.clone())
        }
    }

    async fn wait_ready(&self, stack: &str) -> Result<()> {
        self.record(format!("wait_ready:{}", stack));
        if self.state().fail_wait_ready {
            return Err(ClientError::Timeout(format!("stack {}", stack)));
        }
        Ok(())
    }

    async fn delete(&self, stack: &str) -> Result<()> {
        self.record(format!("delete:{}", stack));
        if self.state().fail_delete {
            return Err(ClientError::api_error(500, "delete refused"));
        }
        Ok(())
    }

    async fn wait_deleted(&self, stack: &str) -> Result<()> {
        self.record(format!("wait_deleted:{}", stack));
        Ok(())
    }
}

#[async_trait]
impl TaskRunner for FakeBackend {
    async fn run(&self, request: RunTask) -> Result<Vec<TaskHandle>> {
        self.record("run");
        self.state().runs.push(request);
        Ok(vec![TaskHandle("task-1".to_string())])
    }

    async fn describe_tasks(
        &self,
        _cluster: &str,
        tasks: &[TaskHandle],
    ) -> Result<Vec<TaskDescription>> {
        self.record("describe_tasks");
        let mut state = self.state();
        let next = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().copied()
        };
        let status = next.unwrap_or(TaskStatus::Unknown);

        let container = ContainerDescription {
            name: MAIN_STACK.to_string(),
            last_status: state.container_status.clone(),
            exit_code: state.exit_code,
        };

        Ok(tasks
            .iter()
            .map(|task| TaskDescription {
                task: task.clone(),
                last_status: status,
                containers: vec![container.clone()],
            })
            .collect())
    }

    async fn wait_running(&self, _cluster: &str, _tasks: &[TaskHandle]) -> Result<()> {
        self.record("wait_running");
        if self.state().fail_wait_running {
            return Err(ClientError::Timeout("task to be running".to_string()));
        }
        Ok(())
    }

    async fn wait_stopped(&self, _cluster: &str, _tasks: &[TaskHandle]) -> Result<()> {
        self.record("wait_stopped");
        Ok(())
    }
}

#[async_trait]
impl LogStream for FakeBackend {
    async fn describe_stream(&self, stream: &str) -> Result<StreamDescription> {
        self.record(format!("describe_stream:{}", stream));
        Ok(StreamDescription {
            name: stream.to_string(),
            shards: self.state().shards.clone(),
        })
    }

    async fn shard_iterator(
        &self,
        _stream: &str,
        shard_id: &str,
        _position: IteratorPosition,
    ) -> Result<ShardIterator> {
        self.record(format!("shard_iterator:{}", shard_id));
        Ok(ShardIterator("iterator-0".to_string()))
    }

    async fn get_records(&self, _iterator: &ShardIterator) -> Result<RecordBatch> {
        self.record("get_records");
        let mut state = self.state();
        if state.fail_records {
            return Err(ClientError::api_error(500, "stream unavailable"));
        }
        Ok(state.batches.pop_front().unwrap_or_else(idle_batch))
    }
}

/// Batch without records that keeps the shard open
pub fn idle_batch() -> RecordBatch {
    RecordBatch {
        records: vec![],
        next_iterator: Some(ShardIterator("iterator-idle".to_string())),
    }
}

/// Batch holding one data record with the given lines
pub fn data_batch(lines: &[&str]) -> RecordBatch {
    let events: Vec<_> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| json!({ "id": i.to_string(), "timestamp": 1_700_000_000_000i64, "message": line }))
        .collect();

    RecordBatch {
        records: vec![Record {
            sequence_number: "1".to_string(),
            data: encode_batch(&json!({
                "messageType": "DATA_MESSAGE",
                "logGroup": MAIN_STACK,
                "logStream": "job",
                "logEvents": events,
            })),
        }],
        next_iterator: Some(ShardIterator("iterator-next".to_string())),
    }
}

/// Sink that keeps every line it receives
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub lines: Vec<String>,
}

impl LogSink for CollectingSink {
    fn write(&mut self, event: &LogEvent) {
        self.lines.push(event.message.clone());
    }
}

pub fn identity() -> JobIdentity {
    JobIdentity {
        build_id: BUILD_ID.to_string(),
        sentinel: SENTINEL.to_string(),
    }
}

pub fn request() -> JobRequest {
    JobRequest {
        image: "unityci/editor:2022.3".to_string(),
        entrypoint: vec!["/bin/sh".to_string()],
        commands: vec!["-c".to_string(), "make build".to_string()],
        mount_dir: "/efsdata".to_string(),
        working_dir: "/efsdata/repo".to_string(),
        environment: vec![EnvironmentVariable::new("FOO", "bar")],
        secrets: vec![],
    }
}

/// A fully resolved task definition for the job
pub fn task_def() -> TaskDef {
    TaskDef {
        stacks: StackSet::for_job(BASE_STACK, BUILD_ID),
        main_template: String::new(),
        failsafe_template: String::new(),
        sentinel: SENTINEL.to_string(),
        handles: ResourceHandles {
            cluster: "cluster-1".to_string(),
            task_definition: "task-def-1".to_string(),
            subnet_one: "subnet-1".to_string(),
            subnet_two: "subnet-2".to_string(),
            security_group: "sg-1".to_string(),
            log_stream: "stream-1".to_string(),
        },
    }
}

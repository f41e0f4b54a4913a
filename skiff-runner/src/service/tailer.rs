//! Log tailer
//!
//! Reads the job's log stream from its oldest record and forwards every line
//! to a [`LogSink`] until the job's sentinel appears. If the task stops
//! without printing the sentinel, the stream is still read for a grace
//! window so late records are not lost.

use skiff_client::{LogStream, StackOrchestrator, TaskRunner};
use skiff_core::domain::stack::TaskDef;
use skiff_core::domain::task::{TaskHandle, TaskStatus};
use skiff_core::dto::stream::{IteratorPosition, Record, ShardIterator};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::console_link;
use crate::decode::decode_record;
use crate::error::{JobFailure, Result};
use crate::sinks::LogSink;

/// Why tailing ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailOutcome {
    /// The sentinel was read
    Sentinel,
    /// The task stopped and the grace window elapsed
    TaskStopped,
    /// The shard was closed
    StreamClosed,
}

/// Tails the log stream of a job
pub struct LogTailer {
    logs: Arc<dyn LogStream>,
    tasks: Arc<dyn TaskRunner>,
    stacks: Arc<dyn StackOrchestrator>,
    poll_interval: Duration,
    stop_grace: Duration,
    region: Option<String>,
}

impl LogTailer {
    /// Creates a new log tailer
    ///
    /// # Arguments
    /// * `logs` - The log stream backend
    /// * `tasks` - The task runner, polled for the task's status
    /// * `stacks` - The stack orchestrator, used to wait for the failsafe stack
    /// * `poll_interval` - Pause between two reads of the stream
    /// * `stop_grace` - How long the stream is read after the task stopped
    /// * `region` - Backend region, enables the console link
    pub fn new(
        logs: Arc<dyn LogStream>,
        tasks: Arc<dyn TaskRunner>,
        stacks: Arc<dyn StackOrchestrator>,
        poll_interval: Duration,
        stop_grace: Duration,
        region: Option<String>,
    ) -> Self {
        Self {
            logs,
            tasks,
            stacks,
            poll_interval,
            stop_grace,
            region,
        }
    }

    /// Forwards the task's log lines until the job's output is complete
    ///
    /// # Errors
    /// Returns [`JobFailure::UnresolvedHandle`] if the log stream was not
    /// resolved, [`JobFailure::Tail`] if the stream or the task status
    /// cannot be read, and [`JobFailure::Cancelled`] once `cancel` fires.
    pub async fn tail(
        &self,
        task: &TaskHandle,
        task_def: &TaskDef,
        sink: &mut dyn LogSink,
        cancel: &CancellationToken,
    ) -> Result<TailOutcome> {
        let stream = task_def.handles.log_stream.as_str();
        if stream.is_empty() {
            return Err(JobFailure::UnresolvedHandle("log_stream".to_string()));
        }

        if let Err(e) = self
            .stacks
            .wait_ready(task_def.stacks.failsafe.as_str())
            .await
        {
            warn!(
                "Failsafe stack {} is not ready, the job stack may outlive a crash: {}",
                task_def.stacks.failsafe, e
            );
        }

        let mut iterator = self.open(stream).await?;

        let cluster = task_def.handles.cluster.as_str();
        let status = self.task_status(cluster, task).await?;
        info!("Task {} is {}, streaming logs", task, status);
        if let Some(link) = self
            .region
            .as_deref()
            .map(|region| console_link(region, task_def.stacks.main.as_str()))
        {
            info!("Logs are also available at {}", link);
        }

        let mut stopped_at: Option<Instant> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(JobFailure::Cancelled);
            }

            if stopped_at.is_none() {
                let status = self.task_status(cluster, task).await?;
                if !status.is_running() {
                    info!(
                        "Task {} is {}, reading remaining logs for {:?}",
                        task, status, self.stop_grace
                    );
                    stopped_at = Some(Instant::now());
                }
            }
            let final_read = stopped_at.is_some_and(|at| at.elapsed() >= self.stop_grace);

            let batch = self
                .logs
                .get_records(&iterator)
                .await
                .map_err(|e| JobFailure::Tail(format!("failed to read {}: {}", stream, e)))?;

            if forward(&batch.records, &task_def.sentinel, sink) {
                info!("End of job output reached");
                return Ok(TailOutcome::Sentinel);
            }

            if final_read {
                info!("Task stopped without printing the end marker");
                return Ok(TailOutcome::TaskStopped);
            }

            match batch.next_iterator {
                Some(next) => iterator = next,
                None => {
                    info!("Log stream {} was closed", stream);
                    return Ok(TailOutcome::StreamClosed);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(JobFailure::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Opens an iterator at the oldest record of the stream's first shard
    async fn open(&self, stream: &str) -> Result<ShardIterator> {
        let description = self
            .logs
            .describe_stream(stream)
            .await
            .map_err(|e| JobFailure::Tail(format!("failed to describe {}: {}", stream, e)))?;

        let shard = description
            .shards
            .first()
            .ok_or_else(|| JobFailure::Tail(format!("log stream {} has no shards", stream)))?;
        debug!("Reading shard {} of {}", shard.id, stream);

        self.logs
            .shard_iterator(stream, &shard.id, IteratorPosition::TrimHorizon)
            .await
            .map_err(|e| {
                JobFailure::Tail(format!("failed to open shard {} of {}: {}", shard.id, stream, e))
            })
    }

    /// Last status of the task, unknown if the backend does not list it
    async fn task_status(&self, cluster: &str, task: &TaskHandle) -> Result<TaskStatus> {
        let descriptions = self
            .tasks
            .describe_tasks(cluster, std::slice::from_ref(task))
            .await
            .map_err(|e| JobFailure::Tail(format!("failed to describe task {}: {}", task, e)))?;

        Ok(descriptions
            .iter()
            .find(|d| &d.task == task)
            .map_or(TaskStatus::Unknown, |d| d.last_status))
    }
}

/// Sends decoded lines to the sink, returns true if the sentinel was among them
///
/// The sentinel line itself is not forwarded. The rest of the batch still is.
fn forward(records: &[Record], sentinel: &str, sink: &mut dyn LogSink) -> bool {
    let mut done = false;
    for record in records {
        let batch = match decode_record(&record.data) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    "Skipping undecodable log record {}: {}",
                    record.sequence_number, e
                );
                continue;
            }
        };

        if !batch.is_data() {
            continue;
        }

        for event in &batch.log_events {
            if event.message.contains(sentinel) {
                done = true;
                continue;
            }
            sink.write(event);
        }
    }
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, CollectingSink, FakeBackend, data_batch, idle_batch};

    fn tailer(fake: &Arc<FakeBackend>) -> LogTailer {
        LogTailer::new(
            fake.clone(),
            fake.clone(),
            fake.clone(),
            Duration::from_millis(1500),
            Duration::from_secs(30),
            None,
        )
    }

    async fn tail(fake: &Arc<FakeBackend>, sink: &mut CollectingSink) -> Result<TailOutcome> {
        tailer(fake)
            .tail(
                &TaskHandle("task-1".to_string()),
                &testing::task_def(),
                sink,
                &CancellationToken::new(),
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_sentinel_while_task_runs() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.batches.push_back(data_batch(&["compiling", "linking"]));
            s.batches.push_back(idle_batch());
            s.batches.push_back(data_batch(&[
                "done",
                testing::SENTINEL,
                "after the end",
            ]));
        }));
        let mut sink = CollectingSink::default();
        let start = Instant::now();

        let outcome = tail(&fake, &mut sink).await.unwrap();

        assert_eq!(outcome, TailOutcome::Sentinel);
        assert_eq!(
            sink.lines,
            vec!["compiling", "linking", "done", "after the end"]
        );
        assert_eq!(fake.count("get_records"), 3);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_grace_window_without_sentinel() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.statuses = [TaskStatus::Running, TaskStatus::Running, TaskStatus::Stopped].into();
            s.batches.push_back(data_batch(&["building"]));
        }));
        let mut sink = CollectingSink::default();
        let start = Instant::now();

        let outcome = tail(&fake, &mut sink).await.unwrap();

        assert_eq!(outcome, TailOutcome::TaskStopped);
        assert_eq!(sink.lines, vec!["building"]);

        // Stop is observed on the second poll, 1.5s in.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(31_500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(33_000), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_read_after_grace_still_forwards_lines() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.statuses = [TaskStatus::Stopped].into();
            s.batches = std::iter::repeat_with(idle_batch).take(20).collect();
            s.batches.push_back(data_batch(&["late line"]));
        }));
        let mut sink = CollectingSink::default();

        let outcome = tail(&fake, &mut sink).await.unwrap();

        assert_eq!(outcome, TailOutcome::TaskStopped);
        assert_eq!(sink.lines, vec!["late line"]);
        assert_eq!(fake.count("get_records"), 21);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_shard_ends_tailing() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            let mut last = data_batch(&["only line"]);
            last.next_iterator = None;
            s.batches.push_back(last);
        }));
        let mut sink = CollectingSink::default();

        let outcome = tail(&fake, &mut sink).await.unwrap();

        assert_eq!(outcome, TailOutcome::StreamClosed);
        assert_eq!(sink.lines, vec!["only line"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_records_are_skipped() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            let mut batch = data_batch(&["kept", testing::SENTINEL]);
            batch.records.insert(
                0,
                Record {
                    sequence_number: "0".to_string(),
                    data: b"plain text".to_vec(),
                },
            );
            s.batches.push_back(batch);
        }));
        let mut sink = CollectingSink::default();

        let outcome = tail(&fake, &mut sink).await.unwrap();

        assert_eq!(outcome, TailOutcome::Sentinel);
        assert_eq!(sink.lines, vec!["kept"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_tailing() {
        let fake = Arc::new(FakeBackend::new());
        let cancel = CancellationToken::new();
        let mut sink = CollectingSink::default();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            canceller.cancel();
        });

        let result = tailer(&fake)
            .tail(
                &TaskHandle("task-1".to_string()),
                &testing::task_def(),
                &mut sink,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(JobFailure::Cancelled)));
    }

    #[tokio::test]
    async fn test_missing_log_stream_is_unresolved() {
        let fake = Arc::new(FakeBackend::new());
        let mut task_def = testing::task_def();
        task_def.handles.log_stream.clear();

        let result = tailer(&fake)
            .tail(
                &TaskHandle("task-1".to_string()),
                &task_def,
                &mut CollectingSink::default(),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(JobFailure::UnresolvedHandle(_))));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stream_without_shards_fails() {
        let fake = Arc::new(FakeBackend::new().with(|s| s.shards.clear()));
        let result = tail(&fake, &mut CollectingSink::default()).await;
        assert!(matches!(result, Err(JobFailure::Tail(_))));
    }

    #[tokio::test]
    async fn test_record_backend_failure_fails_tail() {
        let fake = Arc::new(FakeBackend::new().with(|s| s.fail_records = true));
        let result = tail(&fake, &mut CollectingSink::default()).await;
        assert!(matches!(result, Err(JobFailure::Tail(_))));
    }

    #[tokio::test]
    async fn test_failsafe_wait_failure_is_only_a_warning() {
        let fake = Arc::new(FakeBackend::new().with(|s| {
            s.fail_wait_ready = true;
            s.batches.push_back(data_batch(&[testing::SENTINEL]));
        }));
        let outcome = tail(&fake, &mut CollectingSink::default()).await.unwrap();
        assert_eq!(outcome, TailOutcome::Sentinel);
    }

    #[test]
    fn test_lines_after_sentinel_in_later_records_are_kept() {
        let mut batch = data_batch(&["before", testing::SENTINEL, "same record"]);
        batch
            .records
            .extend(data_batch(&["second record"]).records);
        let mut sink = CollectingSink::default();

        assert!(forward(&batch.records, testing::SENTINEL, &mut sink));
        assert_eq!(sink.lines, vec!["before", "same record", "second record"]);
    }

    #[test]
    fn test_control_messages_are_ignored() {
        let record = Record {
            sequence_number: "1".to_string(),
            data: crate::decode::encode_batch(&serde_json::json!({
                "messageType": "CONTROL_MESSAGE",
                "logEvents": [{ "message": testing::SENTINEL }]
            })),
        };
        let mut sink = CollectingSink::default();

        assert!(!forward(&[record], testing::SENTINEL, &mut sink));
        assert!(sink.lines.is_empty());
    }
}

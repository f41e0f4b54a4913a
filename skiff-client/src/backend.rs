//! Backend contracts
//!
//! The lifecycle controller never talks to infrastructure directly. It goes
//! through these three traits, so production code can use
//! [`GatewayClient`](crate::GatewayClient) and tests can use in-memory fakes.

use async_trait::async_trait;
use skiff_core::domain::task::TaskHandle;
use skiff_core::dto::stack::{StackResource, SubmitStack};
use skiff_core::dto::stream::{IteratorPosition, RecordBatch, ShardIterator, StreamDescription};
use skiff_core::dto::task::{RunTask, TaskDescription};

use crate::error::Result;

/// Infrastructure stack orchestrator
#[async_trait]
pub trait StackOrchestrator: Send + Sync {
    /// Creates a stack from a template
    async fn submit(&self, request: SubmitStack) -> Result<()>;

    /// Lists the resources of a stack
    async fn describe_resources(&self, stack: &str) -> Result<Vec<StackResource>>;

    /// Blocks until the stack finished creating
    ///
    /// # Errors
    /// Returns [`ClientError::Timeout`](crate::ClientError::Timeout) if the
    /// backend gives up waiting.
    async fn wait_ready(&self, stack: &str) -> Result<()>;

    /// Requests deletion of a stack
    async fn delete(&self, stack: &str) -> Result<()>;

    /// Blocks until the stack is deleted
    async fn wait_deleted(&self, stack: &str) -> Result<()>;
}

/// Container task runner
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Starts tasks and returns their handles
    async fn run(&self, request: RunTask) -> Result<Vec<TaskHandle>>;

    /// Describes tasks of a cluster
    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskHandle],
    ) -> Result<Vec<TaskDescription>>;

    /// Blocks until all tasks are running
    async fn wait_running(&self, cluster: &str, tasks: &[TaskHandle]) -> Result<()>;

    /// Blocks until all tasks are stopped
    async fn wait_stopped(&self, cluster: &str, tasks: &[TaskHandle]) -> Result<()>;
}

/// Sharded log stream
#[async_trait]
pub trait LogStream: Send + Sync {
    /// Describes a stream and its shards
    async fn describe_stream(&self, stream: &str) -> Result<StreamDescription>;

    /// Creates an iterator on a shard
    async fn shard_iterator(
        &self,
        stream: &str,
        shard_id: &str,
        position: IteratorPosition,
    ) -> Result<ShardIterator>;

    /// Reads the next records at an iterator
    async fn get_records(&self, iterator: &ShardIterator) -> Result<RecordBatch>;
}

//! Stack domain types
//!
//! A job provisions two stacks: the main stack holding the task definition
//! and log stream, and a failsafe stack that deletes the main stack after a
//! time-to-live if the controller dies before cleaning up. Both live in one
//! [`StackSet`] so they are always torn down together.

use serde::{Deserialize, Serialize};

/// Logical resource ids looked up after provisioning
pub mod logical_id {
    /// In the shared base stack
    pub const CLUSTER: &str = "ECSCluster";
    pub const SUBNET_ONE: &str = "PublicSubnetOne";
    pub const SUBNET_TWO: &str = "PublicSubnetTwo";
    pub const SECURITY_GROUP: &str = "ContainerSecurityGroup";

    /// In the job's own stack
    pub const TASK_DEFINITION: &str = "TaskDefinition";
    pub const LOG_STREAM: &str = "KinesisStream";
}

/// Name of a provisioned stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackRef {
    pub name: String,
}

impl StackRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for StackRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The stacks owned by a single job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSet {
    /// Pre-existing account-level stack, read only
    pub base: StackRef,
    /// Job stack with the task definition and log stream
    pub main: StackRef,
    /// Self-expiring stack that deletes `main` after its TTL
    pub failsafe: StackRef,
}

impl StackSet {
    /// Derives the job's stack names from the base stack and build id
    pub fn for_job(base_stack: &str, build_id: &str) -> Self {
        let main = format!("{}-{}", base_stack, build_id);
        let failsafe = format!("{}-cleanup", main);
        Self {
            base: StackRef::new(base_stack),
            main: StackRef::new(main),
            failsafe: StackRef::new(failsafe),
        }
    }

    /// Stacks this job created, in deletion order
    pub fn owned(&self) -> [&StackRef; 2] {
        [&self.main, &self.failsafe]
    }
}

/// Physical resource ids resolved after provisioning
///
/// An empty string means the resource was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandles {
    pub cluster: String,
    pub task_definition: String,
    pub subnet_one: String,
    pub subnet_two: String,
    pub security_group: String,
    pub log_stream: String,
}

impl ResourceHandles {
    /// Names of the handles required to launch a task that are unresolved
    pub fn missing_for_launch(&self) -> Vec<&'static str> {
        [
            (logical_id::CLUSTER, &self.cluster),
            (logical_id::TASK_DEFINITION, &self.task_definition),
            (logical_id::SUBNET_ONE, &self.subnet_one),
            (logical_id::SUBNET_TWO, &self.subnet_two),
            (logical_id::SECURITY_GROUP, &self.security_group),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Resolved descriptor of a provisioned job
///
/// Created once after stack resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    pub stacks: StackSet,
    pub main_template: String,
    pub failsafe_template: String,
    pub sentinel: String,
    pub handles: ResourceHandles,
}

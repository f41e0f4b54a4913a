//! Task runner DTOs

use serde::{Deserialize, Serialize};

use crate::domain::task::{TaskHandle, TaskStatus};
use crate::domain::variable::EnvironmentVariable;

/// Compute capacity used to run a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchType {
    /// Serverless capacity, isolated network per task
    Fargate,
}

/// Per-container overrides applied at launch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerOverride {
    pub name: String,
    pub environment: Vec<EnvironmentVariable>,
}

/// Isolated network placement of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
}

/// Request to start a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTask {
    pub cluster: String,
    pub task_definition: String,
    pub launch_type: LaunchType,
    pub platform_version: String,
    pub overrides: Vec<ContainerOverride>,
    pub network: NetworkConfiguration,
}

/// Request to describe tasks of a cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeTasks {
    pub cluster: String,
    pub tasks: Vec<TaskHandle>,
}

/// State a task wait blocks on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskWaitState {
    Running,
    Stopped,
}

/// Request to block until tasks reach a state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitTasks {
    pub cluster: String,
    pub tasks: Vec<TaskHandle>,
    pub until: TaskWaitState,
}

/// Reported state of a container within a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_status: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

/// Reported state of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescription {
    pub task: TaskHandle,
    pub last_status: TaskStatus,
    #[serde(default)]
    pub containers: Vec<ContainerDescription>,
}

impl TaskDescription {
    /// The job container, which is the first one of the task
    pub fn primary_container(&self) -> Option<&ContainerDescription> {
        self.containers.first()
    }
}

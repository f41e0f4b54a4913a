//! Stack orchestrator DTOs

use serde::{Deserialize, Serialize};

/// Stack template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Capabilities a template must acknowledge before it can be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    /// The template creates IAM resources
    CapabilityIam,
}

/// Request to create a stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitStack {
    pub name: String,
    pub template_body: String,
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl SubmitStack {
    /// Looks up a parameter value by key
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

/// State a stack wait blocks on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackWaitState {
    /// Creation completed
    Ready,
    /// Deletion completed
    Deleted,
}

/// Request to block until a stack reaches a state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitStack {
    pub until: StackWaitState,
}

/// One resource of a stack's resource graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResource {
    pub logical_id: String,
    /// Absent while the resource is still being created
    #[serde(default)]
    pub physical_id: Option<String>,
}

impl StackResource {
    pub fn new(logical_id: impl Into<String>, physical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            physical_id: Some(physical_id.into()),
        }
    }
}

/// Finds the physical id of a logical resource, or an empty string
pub fn physical_id_of(resources: &[StackResource], logical_id: &str) -> String {
    resources
        .iter()
        .find(|r| r.logical_id == logical_id)
        .and_then(|r| r.physical_id.clone())
        .unwrap_or_default()
}

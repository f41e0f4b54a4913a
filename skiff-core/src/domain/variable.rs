//! Build variables and secrets
//!
//! Environment variables and secrets are both turned into template
//! parameters. Parameter names must be alphanumeric, so every key goes
//! through [`sanitize_key`] before it reaches a template, while the original
//! name stays visible to the container.

use serde::{Deserialize, Serialize};

/// Strips everything but ASCII letters and digits from a name
///
/// The result is usable as a template parameter identifier. Sanitizing an
/// already sanitized key returns it unchanged.
pub fn sanitize_key(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Environment variable passed to the build container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Template parameter name for this variable
    pub fn parameter_key(&self) -> String {
        sanitize_key(&self.name)
    }
}

/// Secret injected into the build container through a secret resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub parameter_key: String,
    pub parameter_value: String,
    /// Name the container sees; defaults to `parameter_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_variable: Option<String>,
}

impl Secret {
    pub fn new(parameter_key: impl Into<String>, parameter_value: impl Into<String>) -> Self {
        Self {
            parameter_key: parameter_key.into(),
            parameter_value: parameter_value.into(),
            environment_variable: None,
        }
    }

    /// Sets the environment variable name the container will see
    pub fn with_environment_variable(mut self, name: impl Into<String>) -> Self {
        self.environment_variable = Some(name.into());
        self
    }

    /// Template parameter name for this secret
    pub fn sanitized_key(&self) -> String {
        sanitize_key(&self.parameter_key)
    }

    /// Environment variable name bound inside the container
    pub fn container_name(&self) -> &str {
        self.environment_variable
            .as_deref()
            .unwrap_or(&self.parameter_key)
    }
}

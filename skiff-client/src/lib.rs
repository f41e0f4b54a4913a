//! Skiff Backend Client
//!
//! Backend contracts used by the lifecycle controller, plus a JSON-over-HTTP
//! implementation talking to a control-plane gateway that fronts the stack
//! orchestrator, the task runner and the log stream.
//!
//! Gateway endpoints:
//! - `POST   /api/stacks` - create a stack
//! - `GET    /api/stacks/{name}/resources` - list stack resources
//! - `POST   /api/stacks/{name}/wait` - wait for `ready` or `deleted`
//! - `DELETE /api/stacks/{name}` - delete a stack
//! - `POST   /api/tasks/run` - start tasks
//! - `POST   /api/tasks/describe` - describe tasks
//! - `POST   /api/tasks/wait` - wait for `running` or `stopped`
//! - `GET    /api/streams/{name}` - describe a log stream
//! - `POST   /api/streams/{name}/iterator` - create a shard iterator
//! - `POST   /api/streams/records` - read records
//!
//! Wait endpoints answer `408` or `504` when they give up, which maps to
//! [`ClientError::Timeout`].
//!
//! # Example
//!
//! ```no_run
//! use skiff_client::{GatewayClient, StackOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GatewayClient::new("http://localhost:8080");
//!
//!     let resources = client.describe_resources("game-ci").await?;
//!     println!("Base stack has {} resources", resources.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
mod stacks;
mod streams;
mod tasks;

pub use backend::{LogStream, StackOrchestrator, TaskRunner};
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the control-plane gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
    /// Base URL of the gateway (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the gateway API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a gateway client on top of a configured HTTP client
    ///
    /// Wait endpoints hold the request open until the stack or task settles,
    /// so a custom client should not time out sooner than the gateway does.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the gateway
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Deserialize a successful JSON response
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Accept any successful response, ignoring its body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        check_status(response).await.map(|_| ())
    }
}

/// Turns a non-success status into a [`ClientError`] carrying the body text
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::api_error(status.as_u16(), message))
}

//! Stack orchestrator endpoints

use async_trait::async_trait;
use skiff_core::dto::stack::{StackResource, StackWaitState, SubmitStack, WaitStack};
use tracing::debug;

use crate::GatewayClient;
use crate::backend::StackOrchestrator;
use crate::error::{ClientError, Result};

impl GatewayClient {
    async fn wait_stack(&self, stack: &str, until: StackWaitState) -> Result<()> {
        let url = format!("{}/api/stacks/{}/wait", self.base_url, stack);
        let response = self
            .client
            .post(&url)
            .json(&WaitStack { until })
            .send()
            .await?;

        self.handle_empty_response(response)
            .await
            .map_err(|e| match e {
                ClientError::Timeout(_) => {
                    ClientError::Timeout(format!("stack {} to be {:?}", stack, until))
                }
                other => other,
            })
    }
}

#[async_trait]
impl StackOrchestrator for GatewayClient {
    async fn submit(&self, request: SubmitStack) -> Result<()> {
        debug!("Submitting stack {}", request.name);

        let url = format!("{}/api/stacks", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_empty_response(response).await
    }

    async fn describe_resources(&self, stack: &str) -> Result<Vec<StackResource>> {
        let url = format!("{}/api/stacks/{}/resources", self.base_url, stack);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    async fn wait_ready(&self, stack: &str) -> Result<()> {
        self.wait_stack(stack, StackWaitState::Ready).await
    }

    async fn delete(&self, stack: &str) -> Result<()> {
        debug!("Deleting stack {}", stack);

        let url = format!("{}/api/stacks/{}", self.base_url, stack);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn wait_deleted(&self, stack: &str) -> Result<()> {
        self.wait_stack(stack, StackWaitState::Deleted).await
    }
}

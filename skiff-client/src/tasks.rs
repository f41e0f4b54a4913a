//! Task runner endpoints

use async_trait::async_trait;
use skiff_core::domain::task::TaskHandle;
use skiff_core::dto::task::{DescribeTasks, RunTask, TaskDescription, TaskWaitState, WaitTasks};

use crate::GatewayClient;
use crate::backend::TaskRunner;
use crate::error::{ClientError, Result};

impl GatewayClient {
    async fn wait_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskHandle],
        until: TaskWaitState,
    ) -> Result<()> {
        let url = format!("{}/api/tasks/wait", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&WaitTasks {
                cluster: cluster.to_string(),
                tasks: tasks.to_vec(),
                until,
            })
            .send()
            .await?;

        self.handle_empty_response(response)
            .await
            .map_err(|e| match e {
                ClientError::Timeout(_) => {
                    ClientError::Timeout(format!("{} task(s) to be {:?}", tasks.len(), until))
                }
                other => other,
            })
    }
}

#[async_trait]
impl TaskRunner for GatewayClient {
    async fn run(&self, request: RunTask) -> Result<Vec<TaskHandle>> {
        let url = format!("{}/api/tasks/run", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        self.handle_response(response).await
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskHandle],
    ) -> Result<Vec<TaskDescription>> {
        let url = format!("{}/api/tasks/describe", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&DescribeTasks {
                cluster: cluster.to_string(),
                tasks: tasks.to_vec(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn wait_running(&self, cluster: &str, tasks: &[TaskHandle]) -> Result<()> {
        self.wait_tasks(cluster, tasks, TaskWaitState::Running).await
    }

    async fn wait_stopped(&self, cluster: &str, tasks: &[TaskHandle]) -> Result<()> {
        self.wait_tasks(cluster, tasks, TaskWaitState::Stopped).await
    }
}

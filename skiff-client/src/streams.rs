//! Log stream endpoints

use async_trait::async_trait;
use skiff_core::dto::stream::{
    GetRecords, GetShardIterator, IteratorPosition, RecordBatch, ShardIterator, StreamDescription,
};

use crate::GatewayClient;
use crate::backend::LogStream;
use crate::error::Result;

#[async_trait]
impl LogStream for GatewayClient {
    async fn describe_stream(&self, stream: &str) -> Result<StreamDescription> {
        let url = format!("{}/api/streams/{}", self.base_url, stream);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    async fn shard_iterator(
        &self,
        stream: &str,
        shard_id: &str,
        position: IteratorPosition,
    ) -> Result<ShardIterator> {
        let url = format!("{}/api/streams/{}/iterator", self.base_url, stream);
        let response = self
            .client
            .post(&url)
            .json(&GetShardIterator {
                shard_id: shard_id.to_string(),
                position,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn get_records(&self, iterator: &ShardIterator) -> Result<RecordBatch> {
        let url = format!("{}/api/streams/records", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GetRecords {
                iterator: iterator.clone(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}

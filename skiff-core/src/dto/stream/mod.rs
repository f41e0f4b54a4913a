//! Log stream DTOs
//!
//! Record payloads are raw bytes; on the wire they travel as standard
//! base64 strings.

use serde::{Deserialize, Serialize};

/// Shard of a log stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    pub id: String,
}

/// Description of a log stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescription {
    pub name: String,
    pub shards: Vec<Shard>,
}

/// Where a new shard iterator starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IteratorPosition {
    /// Oldest record still retained
    TrimHorizon,
}

/// Opaque cursor into a shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardIterator(pub String);

impl ShardIterator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request for a new shard iterator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetShardIterator {
    pub shard_id: String,
    pub position: IteratorPosition,
}

/// Request to read records at an iterator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecords {
    pub iterator: ShardIterator,
}

/// One compressed record of the stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub sequence_number: String,
    #[serde(with = "serde_b64")]
    pub data: Vec<u8>,
}

/// Result of reading from a shard iterator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBatch {
    pub records: Vec<Record>,
    /// `None` once the shard is closed
    #[serde(default)]
    pub next_iterator: Option<ShardIterator>,
}

mod serde_b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

//! Log domain types
//!
//! Task output reaches the log stream as batches produced by the log
//! subscription. Each decompressed record holds one [`LogBatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a log batch message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Carries log events
    DataMessage,
    /// Connectivity probe from the subscription, no events
    ControlMessage,
    #[serde(other)]
    Unknown,
}

/// One decoded record of the log stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    pub message_type: MessageType,
    #[serde(default)]
    pub log_group: String,
    #[serde(default)]
    pub log_stream: String,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

impl LogBatch {
    pub fn is_data(&self) -> bool {
        self.message_type == MessageType::DataMessage
    }
}

/// A single line written by the task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub id: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
    pub message: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            timestamp: 0,
            message: message.into(),
        }
    }

    /// Time the line was logged, `None` when the batch carried no timestamp
    pub fn time(&self) -> Option<DateTime<Utc>> {
        if self.timestamp <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

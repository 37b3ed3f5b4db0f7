//! Message queue producer port.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::QueueError;

/// One message to publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueRecord {
    pub topic: String,
    pub value: Option<Bytes>,
    pub key: Option<Bytes>,
    pub headers: Vec<(String, Bytes)>,
    pub partition: Option<i32>,
    pub timestamp_ms: Option<i64>,
}

impl QueueRecord {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<Bytes>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<Bytes>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }

    #[must_use]
    pub fn timestamp_ms(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// What the producer reports about a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryHandle {
    pub topic: String,
    pub partition: Option<i32>,
    pub offset: Option<i64>,
}

/// Message queue producer.
#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send(&self, record: QueueRecord) -> Result<DeliveryHandle, QueueError>;
}

//! Key-value store port.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::KvError;

/// Key-value store client with plain get/set semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, KvError>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), KvError>;

    async fn delete(&self, key: &str) -> Result<(), KvError>;
}

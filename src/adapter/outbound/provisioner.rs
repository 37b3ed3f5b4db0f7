//! Standard client provisioner.
//!
//! Builds the Pushgateway metrics client directly. Queue and key-value
//! drivers are not bundled; a host registers factories for them and, without
//! one, the capability stays absent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::port::outbound::{
    ClientProvisioner, KeyValueStore, MessageProducer, MetricsClient, MetricsTarget,
};

use super::pushgateway::{PushgatewayClient, DEFAULT_PUSH_TIMEOUT};

/// Builds a message producer from a broker list.
pub type ProducerFactory =
    Arc<dyn Fn(&str) -> anyhow::Result<Arc<dyn MessageProducer>> + Send + Sync>;

/// Builds a key-value client from a connection URL.
pub type KeyValueFactory = Arc<dyn Fn(&str) -> anyhow::Result<Arc<dyn KeyValueStore>> + Send + Sync>;

/// Provisioner used by the `flowhost` binary.
#[derive(Clone)]
pub struct StandardProvisioner {
    push_timeout: Duration,
    producer_factory: Option<ProducerFactory>,
    key_value_factory: Option<KeyValueFactory>,
}

impl StandardProvisioner {
    #[must_use]
    pub fn new(push_timeout: Duration) -> Self {
        Self {
            push_timeout,
            producer_factory: None,
            key_value_factory: None,
        }
    }

    #[must_use]
    pub fn with_producer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Arc<dyn MessageProducer>> + Send + Sync + 'static,
    {
        self.producer_factory = Some(Arc::new(factory));
        self
    }

    #[must_use]
    pub fn with_key_value_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Arc<dyn KeyValueStore>> + Send + Sync + 'static,
    {
        self.key_value_factory = Some(Arc::new(factory));
        self
    }
}

impl Default for StandardProvisioner {
    fn default() -> Self {
        Self::new(DEFAULT_PUSH_TIMEOUT)
    }
}

impl fmt::Debug for StandardProvisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardProvisioner")
            .field("push_timeout", &self.push_timeout)
            .field("producer_factory", &self.producer_factory.is_some())
            .field("key_value_factory", &self.key_value_factory.is_some())
            .finish()
    }
}

impl ClientProvisioner for StandardProvisioner {
    fn metrics(&self, target: &MetricsTarget) -> anyhow::Result<Arc<dyn MetricsClient>> {
        Ok(Arc::new(PushgatewayClient::new(target, self.push_timeout)?))
    }

    fn producer(&self, brokers: &str) -> anyhow::Result<Option<Arc<dyn MessageProducer>>> {
        match &self.producer_factory {
            Some(factory) => factory(brokers).map(Some),
            None => {
                warn!(brokers, "no message queue driver registered, producer unavailable");
                Ok(None)
            }
        }
    }

    fn key_value(&self, url: &str) -> anyhow::Result<Option<Arc<dyn KeyValueStore>>> {
        match &self.key_value_factory {
            Some(factory) => factory(url).map(Some),
            None => {
                warn!(url, "no key-value driver registered, client unavailable");
                Ok(None)
            }
        }
    }
}

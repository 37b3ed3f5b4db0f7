//! Client provisioning port.
//!
//! The specialization controller decides which clients a function gets and
//! where they point; a [`ClientProvisioner`] builds them. Construction
//! failures abort specialization.

use std::sync::Arc;

use crate::core::domain::FunctionIdentity;

use super::{KeyValueStore, MessageProducer, MetricsClient};

/// Where and for whom a metrics client pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsTarget {
    pub pushgateway_url: String,
    pub identity: FunctionIdentity,
    pub update_time: String,
}

/// Builds collaborator clients for a specialized function.
pub trait ClientProvisioner: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed.
    fn metrics(&self, target: &MetricsTarget) -> anyhow::Result<Arc<dyn MetricsClient>>;

    /// A producer connected to `brokers`, or `None` when no queue driver is
    /// available in this host.
    ///
    /// # Errors
    ///
    /// Returns an error when the producer cannot be constructed.
    fn producer(&self, brokers: &str) -> anyhow::Result<Option<Arc<dyn MessageProducer>>>;

    /// A key-value client for `url`, or `None` when no driver is available.
    ///
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed.
    fn key_value(&self, url: &str) -> anyhow::Result<Option<Arc<dyn KeyValueStore>>>;
}

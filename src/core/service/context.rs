//! Per-request execution context handed to the entry point.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::cache::TtlCache;
use crate::core::domain::{ConfigTree, FlowEdge, FunctionIdentity};
use crate::error::{OutboundError, QueueError};
use crate::port::outbound::{DeliveryHandle, KeyValueStore, MessageProducer, MetricsClient, QueueRecord};

use super::outbound::OutboundCall;
use super::state::{CacheValue, HostState};

/// What a user function sees of the host while it handles one request.
///
/// Cheap to clone; every clone refers to the same host state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    state: Arc<HostState>,
}

impl RequestContext {
    pub fn new(request_id: Uuid, state: Arc<HostState>) -> Self {
        Self { request_id, state }
    }

    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[must_use]
    pub fn identity(&self) -> &FunctionIdentity {
        self.state.identity()
    }

    #[must_use]
    pub fn configs(&self) -> &ConfigTree {
        self.state.configs()
    }

    #[must_use]
    pub fn secrets(&self) -> &ConfigTree {
        self.state.secrets()
    }

    #[must_use]
    pub fn cache(&self) -> Option<&TtlCache<CacheValue>> {
        self.state.cache()
    }

    #[must_use]
    pub fn metrics(&self) -> Option<&Arc<dyn MetricsClient>> {
        self.state.clients().metrics.as_ref()
    }

    #[must_use]
    pub fn producer(&self) -> Option<&Arc<dyn MessageProducer>> {
        self.state.clients().producer.as_ref()
    }

    #[must_use]
    pub fn key_value(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.state.clients().key_value.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &Arc<HostState> {
        &self.state
    }

    /// Call another function through the router.
    ///
    /// The response is returned untouched; a non-2xx status is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the target URL is invalid or the request fails in transit.
    pub async fn call_function(
        &self,
        namespace: &str,
        name: &str,
        call: OutboundCall,
    ) -> Result<reqwest::Response, OutboundError> {
        self.state
            .router()
            .call(self.state.identity(), namespace, name, call)
            .await
    }

    /// Send `record` through the message producer and record the
    /// function-to-topic flow edge.
    ///
    /// The edge is recorded once the send returns, whether or not it
    /// succeeded; it counts attempts, not deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Unavailable`] when the function has no producer,
    /// or the producer's error when the send fails.
    pub async fn publish(&self, record: QueueRecord) -> Result<DeliveryHandle, QueueError> {
        let Some(producer) = self.producer() else {
            return Err(QueueError::Unavailable);
        };

        let topic = record.topic.clone();
        let result = producer.send(record).await;
        match &result {
            Ok(handle) => debug!(
                topic = %topic,
                partition = ?handle.partition,
                offset = ?handle.offset,
                "message published"
            ),
            Err(e) => warn!(topic = %topic, error = %e, "message publish failed"),
        }

        self.state
            .emit_flow_edge(&FlowEdge::function_to_topic(self.state.identity(), &topic))
            .await;

        result
    }
}

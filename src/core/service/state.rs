//! Durable host state created by specialization.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::cache::TtlCache;
use crate::core::domain::{ConfigTree, FlowEdge, FunctionIdentity, HandlerSpec, LogLevel};
use crate::port::inbound::EntryPoint;
use crate::port::outbound::{KeyValueStore, MessageProducer, MetricsClient};

use super::outbound::RouterClient;

/// Value type of the pod-lifetime cache.
pub type CacheValue = serde_json::Value;

/// Collaborator clients; each is absent when disabled or unresolved.
#[derive(Clone, Default)]
pub struct Clients {
    pub metrics: Option<Arc<dyn MetricsClient>>,
    pub producer: Option<Arc<dyn MessageProducer>>,
    pub key_value: Option<Arc<dyn KeyValueStore>>,
}

impl fmt::Debug for Clients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clients")
            .field("metrics", &self.metrics.is_some())
            .field("producer", &self.producer.is_some())
            .field("key_value", &self.key_value.is_some())
            .finish()
    }
}

/// Everything a specialized host serves requests from.
///
/// Built once by the specialization controller and only read afterwards;
/// the cache is the one part requests mutate.
pub struct HostState {
    pub(crate) identity: FunctionIdentity,
    pub(crate) update_time: String,
    pub(crate) code_path: PathBuf,
    pub(crate) handler: HandlerSpec,
    pub(crate) entry_point: Arc<dyn EntryPoint>,
    pub(crate) configs: ConfigTree,
    pub(crate) secrets: ConfigTree,
    pub(crate) clients: Clients,
    pub(crate) cache: Option<TtlCache<CacheValue>>,
    pub(crate) log_level: LogLevel,
    pub(crate) router: RouterClient,
    pub(crate) flow_metric: String,
}

impl HostState {
    #[must_use]
    pub fn identity(&self) -> &FunctionIdentity {
        &self.identity
    }

    #[must_use]
    pub fn update_time(&self) -> &str {
        &self.update_time
    }

    #[must_use]
    pub fn code_path(&self) -> &Path {
        &self.code_path
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerSpec {
        &self.handler
    }

    #[must_use]
    pub fn entry_point(&self) -> &Arc<dyn EntryPoint> {
        &self.entry_point
    }

    #[must_use]
    pub fn configs(&self) -> &ConfigTree {
        &self.configs
    }

    #[must_use]
    pub fn secrets(&self) -> &ConfigTree {
        &self.secrets
    }

    #[must_use]
    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    #[must_use]
    pub fn cache(&self) -> Option<&TtlCache<CacheValue>> {
        self.cache.as_ref()
    }

    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    #[must_use]
    pub fn router(&self) -> &RouterClient {
        &self.router
    }

    /// Full metric name flow-edge samples are recorded under.
    #[must_use]
    pub fn flow_metric(&self) -> &str {
        &self.flow_metric
    }

    /// Record one flow-edge sample. Failures are logged and swallowed.
    pub async fn emit_flow_edge(&self, edge: &FlowEdge) {
        let Some(metrics) = &self.clients.metrics else {
            debug!(destination = %edge.destination, "metrics client absent, flow edge not recorded");
            return;
        };

        if let Err(e) = metrics
            .counter("", &edge.labels(), 1.0, Some(self.flow_metric.as_str()))
            .await
        {
            warn!(
                destination = %edge.destination,
                error = %e,
                "failed to record flow edge"
            );
        }
    }
}

impl fmt::Debug for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostState")
            .field("identity", &self.identity)
            .field("update_time", &self.update_time)
            .field("code_path", &self.code_path)
            .field("handler", &self.handler)
            .field("clients", &self.clients)
            .field("cache", &self.cache.is_some())
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

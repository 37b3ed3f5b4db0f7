//! A host wired to the recording doubles.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::log::RecordingLogControl;
use super::metrics::RecordingMetrics;
use super::producer::RecordingProducer;
use super::provisioner::FakeProvisioner;
use crate::adapter::inbound::{router, EntryPointRegistry};
use crate::core::domain::{FunctionMetadata, FunctionResponse, InboundRequest, SpecializeRequest};
use crate::core::service::{
    HostOptions, HostState, RequestContext, RequestDispatcher, SpecializationController,
};
use crate::error::SpecializationError;
use crate::port::inbound::EntryPoint;

/// Counts invocations of the wrapped entry point.
struct Counting {
    inner: Arc<dyn EntryPoint>,
    count: Arc<AtomicUsize>,
}

#[async_trait]
impl EntryPoint for Counting {
    async fn invoke(
        &self,
        ctx: RequestContext,
        request: InboundRequest,
    ) -> anyhow::Result<FunctionResponse> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(ctx, request).await
    }
}

/// Controller, dispatcher and doubles for one test.
///
/// The entry point is registered as both `main.main` and the legacy
/// `user.main`.
pub struct TestHost {
    pub controller: Arc<SpecializationController>,
    pub dispatcher: RequestDispatcher,
    pub provisioner: Arc<FakeProvisioner>,
    pub metrics: Arc<RecordingMetrics>,
    pub producer: Arc<RecordingProducer>,
    pub log: Arc<RecordingLogControl>,
    invocations: Arc<AtomicUsize>,
}

impl TestHost {
    /// A host whose config and secret roots do not exist.
    pub fn new(entry_point: impl EntryPoint + 'static) -> Self {
        let absent = std::env::temp_dir().join("flowhost-testkit-absent");
        Self::with_options(
            entry_point,
            HostOptions {
                configs_root: absent.join("configs"),
                secrets_root: absent.join("secrets"),
                ..Default::default()
            },
        )
    }

    /// A host reading configs from `configs_root`.
    pub fn with_configs(entry_point: impl EntryPoint + 'static, configs_root: impl Into<PathBuf>) -> Self {
        let absent = std::env::temp_dir().join("flowhost-testkit-absent");
        Self::with_options(
            entry_point,
            HostOptions {
                configs_root: configs_root.into(),
                secrets_root: absent.join("secrets"),
                ..Default::default()
            },
        )
    }

    pub fn with_options(entry_point: impl EntryPoint + 'static, options: HostOptions) -> Self {
        let invocations = Arc::new(AtomicUsize::new(0));
        let inner: Arc<dyn EntryPoint> = Arc::new(entry_point);
        let registry = EntryPointRegistry::new()
            .register(
                "main.main",
                Counting {
                    inner: Arc::clone(&inner),
                    count: Arc::clone(&invocations),
                },
            )
            .register(
                "user.main",
                Counting {
                    inner,
                    count: Arc::clone(&invocations),
                },
            );

        let provisioner = Arc::new(FakeProvisioner::default());
        let log = Arc::new(RecordingLogControl::default());
        let controller = Arc::new(
            SpecializationController::new(options, Arc::new(registry), provisioner.clone())
                .with_log_control(log.clone()),
        );

        Self {
            dispatcher: RequestDispatcher::new(Arc::clone(&controller)),
            controller,
            metrics: Arc::clone(&provisioner.metrics),
            producer: Arc::clone(&provisioner.producer),
            provisioner,
            log,
            invocations,
        }
    }

    /// Number of times the entry point has been invoked.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Specialize as `namespace`/`name` with the default handler.
    pub async fn specialize(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Arc<HostState>, SpecializationError> {
        self.controller.specialize(specialize_request(namespace, name)).await
    }

    /// The HTTP surface over this host's controller.
    pub fn router(&self) -> axum::Router {
        router(Arc::clone(&self.controller))
    }
}

/// A `/v2/specialize` payload for `namespace`/`name` with the default handler.
pub fn specialize_request(namespace: &str, name: &str) -> SpecializeRequest {
    SpecializeRequest {
        filepath: "/userfunc/deployarchive".to_string(),
        function_name: String::new(),
        metadata: FunctionMetadata {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..Default::default()
        },
    }
}

/// A host already specialized as `ns`/`fn`.
pub async fn specialized_host(entry_point: impl EntryPoint + 'static) -> TestHost {
    let host = TestHost::new(entry_point);
    host.specialize("ns", "fn")
        .await
        .expect("test host specializes");
    host
}

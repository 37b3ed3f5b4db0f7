//! Specialization controller.
//!
//! A host starts unspecialized and becomes specialized exactly once, on the
//! first successful specialization call. The transition runs under a gate:
//! concurrent calls are serialized, the first to complete installs the
//! [`HostState`], and every later call is rejected with
//! [`SpecializationError::AlreadySpecialized`]. Readers only ever observe a
//! fully built state.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::core::cache::TtlCache;
use crate::core::domain::{ConfigTree, FunctionIdentity, HandlerSpec, LogLevel, SpecializeRequest};
use crate::error::SpecializationError;
use crate::port::inbound::EntryPointResolver;
use crate::port::outbound::{ClientProvisioner, LogLevelControl, MetricsTarget};

use super::config_resolver::ConfigResolver;
use super::outbound::RouterClient;
use super::settings::{ClientSetting, FunctionSettings, HostDefaults};
use super::state::{Clients, HostState};

pub const DEFAULT_CONFIGS_ROOT: &str = "/configs";
pub const DEFAULT_SECRETS_ROOT: &str = "/secrets";
pub const LEGACY_CODE_PATH: &str = "/userfunc/user";

/// Handler bound by the legacy specialization path.
pub const LEGACY_MODULE: &str = "user";
pub const LEGACY_FUNCTION: &str = "main";

/// Where specialization reads from and what it falls back to.
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub configs_root: PathBuf,
    pub secrets_root: PathBuf,
    pub legacy_code_path: PathBuf,
    pub defaults: HostDefaults,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            configs_root: DEFAULT_CONFIGS_ROOT.into(),
            secrets_root: DEFAULT_SECRETS_ROOT.into(),
            legacy_code_path: LEGACY_CODE_PATH.into(),
            defaults: HostDefaults::default(),
        }
    }
}

/// Owns the one-shot transition to the specialized state.
pub struct SpecializationController {
    gate: Mutex<()>,
    state: OnceLock<Arc<HostState>>,
    options: HostOptions,
    resolver: Arc<dyn EntryPointResolver>,
    provisioner: Arc<dyn ClientProvisioner>,
    log_control: Option<Arc<dyn LogLevelControl>>,
}

impl SpecializationController {
    pub fn new(
        options: HostOptions,
        resolver: Arc<dyn EntryPointResolver>,
        provisioner: Arc<dyn ClientProvisioner>,
    ) -> Self {
        Self {
            gate: Mutex::new(()),
            state: OnceLock::new(),
            options,
            resolver,
            provisioner,
            log_control: None,
        }
    }

    /// Apply function log levels through `control`.
    #[must_use]
    pub fn with_log_control(mut self, control: Arc<dyn LogLevelControl>) -> Self {
        self.log_control = Some(control);
        self
    }

    #[must_use]
    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// The installed state, once specialized.
    #[must_use]
    pub fn state(&self) -> Option<Arc<HostState>> {
        self.state.get().cloned()
    }

    #[must_use]
    pub fn is_specialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Specialize from a `/v2/specialize` payload.
    ///
    /// # Errors
    ///
    /// Fails without specializing if the entry point cannot be resolved, the
    /// metadata lacks a namespace or name, a config root cannot be read, or a
    /// client cannot be provisioned. Fails with `AlreadySpecialized` after a
    /// previous success.
    pub async fn specialize(
        &self,
        request: SpecializeRequest,
    ) -> Result<Arc<HostState>, SpecializationError> {
        let _gate = self.gate.lock().await;
        self.ensure_unspecialized()?;

        let result = self.build(&request).await;
        match result {
            Ok(state) => Ok(self.install(state)),
            Err(e) => {
                error!(error = %e, filepath = %request.filepath, "specialization failed");
                Err(e)
            }
        }
    }

    /// Specialize through the legacy path: a fixed handler at the configured
    /// code path, no metadata, no config, no clients and no cache.
    ///
    /// # Errors
    ///
    /// Fails if the handler cannot be resolved or the host is already specialized.
    pub async fn specialize_legacy(&self) -> Result<Arc<HostState>, SpecializationError> {
        let _gate = self.gate.lock().await;
        self.ensure_unspecialized()?;

        let handler = HandlerSpec::new(LEGACY_MODULE, LEGACY_FUNCTION);
        let code_path = self.options.legacy_code_path.clone();
        info!(code_path = %code_path.display(), %handler, "legacy specialization");

        let entry_point = self.resolver.resolve(&code_path, &handler)?;
        let router = self.router_client(
            &self.options.defaults.router_domain,
            &self.options.defaults.router_template,
        )?;

        Ok(self.install(HostState {
            identity: FunctionIdentity::default(),
            update_time: crate::core::domain::UNKNOWN_UPDATE_TIME.to_string(),
            code_path,
            handler,
            entry_point,
            configs: ConfigTree::empty(),
            secrets: ConfigTree::empty(),
            clients: Clients::default(),
            cache: None,
            log_level: LogLevel::default(),
            router,
            flow_metric: self.options.defaults.flow_metric.clone(),
        }))
    }

    fn ensure_unspecialized(&self) -> Result<(), SpecializationError> {
        if self.is_specialized() {
            warn!("specialization requested on an already specialized host");
            return Err(SpecializationError::AlreadySpecialized);
        }
        Ok(())
    }

    fn install(&self, state: HostState) -> Arc<HostState> {
        let state = Arc::new(state);
        // Callers hold the gate and checked emptiness, so this cannot race.
        let installed = self.state.get_or_init(|| Arc::clone(&state));
        info!(
            function = %installed.identity,
            handler = %installed.handler,
            update_time = %installed.update_time,
            "host specialized"
        );
        Arc::clone(installed)
    }

    async fn build(&self, request: &SpecializeRequest) -> Result<HostState, SpecializationError> {
        let code_path = PathBuf::from(&request.filepath);
        let handler = HandlerSpec::parse(&request.function_name);
        info!(
            filepath = %request.filepath,
            handler = %request.function_name,
            "specialization requested"
        );
        debug!(module = handler.module(), function = handler.function(), "handler parsed");

        let entry_point = self.resolver.resolve(&code_path, &handler)?;

        let metadata = &request.metadata;
        if metadata.namespace.is_empty() {
            return Err(SpecializationError::MetadataMissing { field: "namespace" });
        }
        if metadata.name.is_empty() {
            return Err(SpecializationError::MetadataMissing { field: "name" });
        }
        let identity = FunctionIdentity::new(&metadata.namespace, &metadata.name);
        let update_time = metadata.update_time();

        let (configs, secrets) = self.resolve_trees(&identity).await?;

        let settings = FunctionSettings::derive(&configs, &self.options.defaults);

        let clients = self.provision_clients(&settings, &identity, &update_time)?;
        let cache = if settings.cache_enabled {
            Some(TtlCache::new())
        } else {
            debug!("the cache will not be created");
            None
        };
        let router = self.router_client(&settings.router_domain, &settings.router_template)?;
        // Last step: nothing below can fail.
        self.apply_log_level(&settings);

        Ok(HostState {
            identity,
            update_time,
            code_path,
            handler,
            entry_point,
            configs,
            secrets,
            clients,
            cache,
            log_level: settings.log_level,
            router,
            flow_metric: settings.flow_metric,
        })
    }

    /// Walk both mounted volumes on the blocking pool.
    async fn resolve_trees(
        &self,
        identity: &FunctionIdentity,
    ) -> Result<(ConfigTree, ConfigTree), SpecializationError> {
        let resolver = ConfigResolver::new(&self.options.configs_root, &self.options.secrets_root);
        let identity = identity.clone();
        let trees = tokio::task::spawn_blocking(move || resolver.resolve(&identity)).await??;
        Ok(trees)
    }

    fn apply_log_level(&self, settings: &FunctionSettings) {
        if let Some(rejected) = &settings.rejected_log_level {
            error!(level = %rejected, "logger level is illegal, using debug");
        }
        debug!(level = %settings.log_level, "logger level will be applied");

        if let Some(control) = &self.log_control {
            if let Err(e) = control.apply(settings.log_level) {
                warn!(error = %e, "failed to apply logger level");
            }
        }
    }

    fn provision_clients(
        &self,
        settings: &FunctionSettings,
        identity: &FunctionIdentity,
        update_time: &str,
    ) -> Result<Clients, SpecializationError> {
        let metrics = match &settings.metrics {
            ClientSetting::Enabled(url) => {
                let target = MetricsTarget {
                    pushgateway_url: url.clone(),
                    identity: identity.clone(),
                    update_time: update_time.to_string(),
                };
                debug!(
                    pushgateway_url = %url,
                    prefix = %identity.metric_prefix(),
                    update_time,
                    "creating metrics client"
                );
                Some(
                    self.provisioner
                        .metrics(&target)
                        .map_err(|e| provisioning("metrics", &e))?,
                )
            }
            _ => {
                debug!("the metrics client will not be created");
                None
            }
        };

        let producer = match &settings.producer {
            ClientSetting::Enabled(brokers) => {
                debug!(brokers = %brokers, "creating message producer");
                self.provisioner
                    .producer(brokers)
                    .map_err(|e| provisioning("message producer", &e))?
            }
            ClientSetting::Unresolved => {
                warn!("message producer enabled but no broker list configured");
                None
            }
            ClientSetting::Disabled => {
                debug!("the message producer will not be created");
                None
            }
        };

        let key_value = match &settings.key_value {
            ClientSetting::Enabled(url) => {
                debug!(url = %url, "creating key-value client");
                self.provisioner
                    .key_value(url)
                    .map_err(|e| provisioning("key-value", &e))?
            }
            ClientSetting::Unresolved => {
                warn!("key-value client enabled but no url configured");
                None
            }
            ClientSetting::Disabled => {
                debug!("the key-value client will not be created");
                None
            }
        };

        Ok(Clients {
            metrics,
            producer,
            key_value,
        })
    }

    fn router_client(
        &self,
        domain: &str,
        template: &str,
    ) -> Result<RouterClient, SpecializationError> {
        RouterClient::new(domain, template, self.options.defaults.outbound_timeout).map_err(|e| {
            SpecializationError::Provisioning {
                client: "router",
                reason: e.to_string(),
            }
        })
    }
}

fn provisioning(client: &'static str, error: &anyhow::Error) -> SpecializationError {
    SpecializationError::Provisioning {
        client,
        reason: format!("{error:#}"),
    }
}

//! Settings a function derives from its config tree.
//!
//! Each setting is looked up in the function's `local` subtree, then the
//! cluster-wide `global` subtree, then falls back to a built-in default.
//! Values are trimmed and an empty value counts as unset. An `*-enabled`
//! switch turns a client off only when its value is exactly `n`.

use std::time::Duration;

use crate::core::domain::{ConfigTree, LogLevel};

pub const KEY_LOGGER_LEVEL: &str = "logger_level";
pub const KEY_PROMETHEUS_ENABLED: &str = "prometheus-enabled";
pub const KEY_PUSHGATEWAY_URL: &str = "pushgateway-url";
pub const KEY_KAFKA_ENABLED: &str = "kafka-enabled";
pub const KEY_KAFKA_BROKERS: &str = "kafka-broker-list";
pub const KEY_REDIS_ENABLED: &str = "redis-enabled";
pub const KEY_REDIS_URL: &str = "redis-url";
pub const KEY_CACHE_ENABLED: &str = "podcache-enabled";
pub const KEY_ROUTER_DOMAIN: &str = "fission-router";
pub const KEY_ROUTER_TEMPLATE: &str = "fission-router-template";
pub const KEY_FLOW_METRIC: &str = "fission-flow";

pub const DEFAULT_PUSHGATEWAY_URL: &str = "fission-prometheus-pushgateway.fission:9091";
pub const DEFAULT_ROUTER_DOMAIN: &str = "http://router.fission";
pub const DEFAULT_ROUTER_TEMPLATE: &str = "{domain}/{namespace}/{name}";
pub const DEFAULT_FLOW_METRIC: &str = "fission_flow_recorder_by_env";
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

const DISABLED: &str = "n";

/// Host-level fallbacks, overridable per cluster through the global config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDefaults {
    pub pushgateway_url: String,
    pub router_domain: String,
    pub router_template: String,
    pub flow_metric: String,
    pub outbound_timeout: Duration,
}

impl Default for HostDefaults {
    fn default() -> Self {
        Self {
            pushgateway_url: DEFAULT_PUSHGATEWAY_URL.into(),
            router_domain: DEFAULT_ROUTER_DOMAIN.into(),
            router_template: DEFAULT_ROUTER_TEMPLATE.into(),
            flow_metric: DEFAULT_FLOW_METRIC.into(),
            outbound_timeout: DEFAULT_OUTBOUND_TIMEOUT,
        }
    }
}

/// Whether a client is wanted and where it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSetting {
    Disabled,
    /// Enabled but no address was configured at any level.
    Unresolved,
    Enabled(String),
}

/// Everything specialization derives from the config tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSettings {
    pub log_level: LogLevel,
    /// Configured level name that was not recognized.
    pub rejected_log_level: Option<String>,
    pub metrics: ClientSetting,
    pub producer: ClientSetting,
    pub key_value: ClientSetting,
    pub cache_enabled: bool,
    pub router_domain: String,
    pub router_template: String,
    pub flow_metric: String,
}

impl FunctionSettings {
    /// Derive settings from the function's config tree.
    #[must_use]
    pub fn derive(configs: &ConfigTree, defaults: &HostDefaults) -> Self {
        let lookup = Lookup { tree: configs };

        let (log_level, rejected_log_level) = match lookup.value(KEY_LOGGER_LEVEL) {
            None => (LogLevel::default(), None),
            Some(raw) => match raw.parse::<LogLevel>() {
                Ok(level) => (level, None),
                Err(_) => (LogLevel::default(), Some(raw.to_string())),
            },
        };

        let metrics = if lookup.enabled(KEY_PROMETHEUS_ENABLED, true) {
            ClientSetting::Enabled(
                lookup
                    .value(KEY_PUSHGATEWAY_URL)
                    .unwrap_or(&defaults.pushgateway_url)
                    .to_string(),
            )
        } else {
            ClientSetting::Disabled
        };

        Self {
            log_level,
            rejected_log_level,
            metrics,
            producer: lookup.client(KEY_KAFKA_ENABLED, KEY_KAFKA_BROKERS),
            key_value: lookup.client(KEY_REDIS_ENABLED, KEY_REDIS_URL),
            cache_enabled: lookup.enabled(KEY_CACHE_ENABLED, true),
            router_domain: lookup
                .global(KEY_ROUTER_DOMAIN)
                .unwrap_or(&defaults.router_domain)
                .to_string(),
            router_template: lookup
                .global(KEY_ROUTER_TEMPLATE)
                .unwrap_or(&defaults.router_template)
                .to_string(),
            flow_metric: lookup
                .global(KEY_FLOW_METRIC)
                .unwrap_or(&defaults.flow_metric)
                .to_string(),
        }
    }
}

struct Lookup<'a> {
    tree: &'a ConfigTree,
}

impl<'a> Lookup<'a> {
    fn local(&self, key: &str) -> Option<&'a str> {
        non_empty(self.tree.local_value(key))
    }

    fn global(&self, key: &str) -> Option<&'a str> {
        non_empty(self.tree.global_value(key))
    }

    fn value(&self, key: &str) -> Option<&'a str> {
        self.local(key).or_else(|| self.global(key))
    }

    fn enabled(&self, key: &str, default: bool) -> bool {
        self.value(key).map_or(default, |value| value != DISABLED)
    }

    /// Optional client: off by default, address without built-in fallback.
    fn client(&self, enabled_key: &str, address_key: &str) -> ClientSetting {
        if !self.enabled(enabled_key, false) {
            return ClientSetting::Disabled;
        }
        match self.value(address_key) {
            Some(address) => ClientSetting::Enabled(address.to_string()),
            None => ClientSetting::Unresolved,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

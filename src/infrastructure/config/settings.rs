//! Host configuration loading and validation.
//!
//! Provides the [`Config`] struct that aggregates the host's own settings.
//! These are distinct from a function's config tree: they say where the
//! mounts are and what the host falls back to when a function's global
//! config is silent.
//!
//! # Example
//!
//! ```no_run
//! use flowhost::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("flowhost.toml")?;
//!     let _log = config.logging.init()?;
//!     Ok(())
//! }
//! ```

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::logging::LoggingConfig;
use crate::adapter::outbound::pushgateway::DEFAULT_PUSH_TIMEOUT;
use crate::core::service::settings::{
    DEFAULT_FLOW_METRIC, DEFAULT_OUTBOUND_TIMEOUT, DEFAULT_PUSHGATEWAY_URL, DEFAULT_ROUTER_DOMAIN,
    DEFAULT_ROUTER_TEMPLATE,
};
use crate::core::service::specialization::{
    DEFAULT_CONFIGS_ROOT, DEFAULT_SECRETS_ROOT, LEGACY_CODE_PATH,
};
use crate::core::service::{HostDefaults, HostOptions};
use crate::error::{ConfigError, Result};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8888";

/// Inbound server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.into(),
        }
    }
}

/// Mounted volumes and the legacy code path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub configs: PathBuf,
    pub secrets: PathBuf,
    /// Code path bound by the legacy specialization route.
    pub code: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            configs: DEFAULT_CONFIGS_ROOT.into(),
            secrets: DEFAULT_SECRETS_ROOT.into(),
            code: LEGACY_CODE_PATH.into(),
        }
    }
}

/// Function-to-function call settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutboundConfig {
    pub router_domain: String,
    pub router_template: String,
    pub timeout_secs: u64,
}

impl Default for OutboundConfig {
    fn default() -> Self {
        Self {
            router_domain: DEFAULT_ROUTER_DOMAIN.into(),
            router_template: DEFAULT_ROUTER_TEMPLATE.into(),
            timeout_secs: DEFAULT_OUTBOUND_TIMEOUT.as_secs(),
        }
    }
}

/// Metrics push settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub pushgateway_url: String,
    pub flow_metric: String,
    pub timeout_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            pushgateway_url: DEFAULT_PUSHGATEWAY_URL.into(),
            flow_metric: DEFAULT_FLOW_METRIC.into(),
            timeout_secs: DEFAULT_PUSH_TIMEOUT.as_secs(),
        }
    }
}

/// Host configuration.
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub outbound: OutboundConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from a TOML file, or defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, is malformed, or
    /// fails validation.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::ReadFile(e).into()),
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.outbound.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "outbound.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.metrics.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }
        if !self.outbound.router_template.contains("{name}") {
            return Err(ConfigError::InvalidValue {
                field: "outbound.router_template",
                reason: "must contain {name}".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Address the HTTP surface binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.listen` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidValue {
                field: "server.listen",
                reason: e.to_string(),
            }
            .into()
        })
    }

    #[must_use]
    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics.timeout_secs)
    }

    /// Specialization inputs derived from this configuration.
    #[must_use]
    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            configs_root: self.paths.configs.clone(),
            secrets_root: self.paths.secrets.clone(),
            legacy_code_path: self.paths.code.clone(),
            defaults: HostDefaults {
                pushgateway_url: self.metrics.pushgateway_url.clone(),
                router_domain: self.outbound.router_domain.clone(),
                router_template: self.outbound.router_template.clone(),
                flow_metric: self.metrics.flow_metric.clone(),
                outbound_timeout: Duration::from_secs(self.outbound.timeout_secs),
            },
        }
    }
}

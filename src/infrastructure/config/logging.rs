//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::core::domain::LogLevel;
use crate::port::outbound::LogLevelControl;

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` wins over the configured level until a function level is
    /// applied through the returned handle.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(&self) -> anyhow::Result<LogHandle> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let (filter, handle) = reload::Layer::new(filter);
        let registry = tracing_subscriber::registry().with(filter);

        if self.is_json() {
            registry.with(fmt::layer().json()).try_init()?;
        } else {
            registry.with(fmt::layer()).try_init()?;
        }

        Ok(LogHandle { handle })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default().as_str().into(),
            format: "pretty".into(),
        }
    }
}

/// Handle to the installed subscriber's filter.
#[derive(Clone)]
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle").finish_non_exhaustive()
    }
}

impl LogLevelControl for LogHandle {
    fn apply(&self, level: LogLevel) -> anyhow::Result<()> {
        self.handle.reload(EnvFilter::new(level.as_str()))?;
        Ok(())
    }
}

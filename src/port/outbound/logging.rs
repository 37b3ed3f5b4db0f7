//! Log verbosity control port.

use crate::core::domain::LogLevel;

/// Applies a log level to the running subscriber.
pub trait LogLevelControl: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the logging backend refuses the change.
    fn apply(&self, level: LogLevel) -> anyhow::Result<()>;
}

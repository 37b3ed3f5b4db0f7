//! Metrics client port.

use async_trait::async_trait;

use crate::core::domain::Labels;
use crate::error::TelemetryError;

/// Counter-emitting metrics client.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Add `increment` to the counter series `name` with `labels`.
    ///
    /// `name_override` replaces the full metric name, bypassing any prefix
    /// the client would otherwise apply to `name`.
    async fn counter(
        &self,
        name: &str,
        labels: &Labels,
        increment: f64,
        name_override: Option<&str>,
    ) -> Result<(), TelemetryError>;
}

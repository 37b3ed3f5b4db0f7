//! Metrics client that records samples instead of pushing them.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::domain::Labels;
use crate::error::TelemetryError;
use crate::port::outbound::MetricsClient;

/// One recorded `counter` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Labels,
    pub increment: f64,
    pub name_override: Option<String>,
}

/// Records every counter call; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    samples: Mutex<Vec<Sample>>,
    fail: AtomicBool,
}

impl RecordingMetrics {
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }

    /// Make subsequent calls fail (after recording the sample).
    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricsClient for RecordingMetrics {
    async fn counter(
        &self,
        name: &str,
        labels: &Labels,
        increment: f64,
        name_override: Option<&str>,
    ) -> Result<(), TelemetryError> {
        self.samples.lock().push(Sample {
            name: name.to_string(),
            labels: labels.clone(),
            increment,
            name_override: name_override.map(str::to_string),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(TelemetryError::Rejected { status: 503 });
        }
        Ok(())
    }
}

//! Provisioner handing out the recording doubles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::kv::MemoryKv;
use super::metrics::RecordingMetrics;
use super::producer::RecordingProducer;
use crate::port::outbound::{
    ClientProvisioner, KeyValueStore, MessageProducer, MetricsClient, MetricsTarget,
};

/// Every client it builds is the same shared double, so tests can inspect
/// what the host did with it.
#[derive(Debug, Default)]
pub struct FakeProvisioner {
    pub metrics: Arc<RecordingMetrics>,
    pub producer: Arc<RecordingProducer>,
    pub kv: Arc<MemoryKv>,
    targets: Mutex<Vec<MetricsTarget>>,
    brokers: Mutex<Vec<String>>,
    fail_metrics: AtomicBool,
}

impl FakeProvisioner {
    /// Metrics targets requested so far.
    pub fn targets(&self) -> Vec<MetricsTarget> {
        self.targets.lock().clone()
    }

    /// Broker lists requested so far.
    pub fn brokers(&self) -> Vec<String> {
        self.brokers.lock().clone()
    }

    /// Make metrics client construction fail.
    pub fn fail_metrics(&self, fail: bool) {
        self.fail_metrics.store(fail, Ordering::SeqCst);
    }
}

impl ClientProvisioner for FakeProvisioner {
    fn metrics(&self, target: &MetricsTarget) -> anyhow::Result<Arc<dyn MetricsClient>> {
        if self.fail_metrics.load(Ordering::SeqCst) {
            anyhow::bail!("invalid pushgateway address '{}'", target.pushgateway_url);
        }
        self.targets.lock().push(target.clone());
        Ok(self.metrics.clone() as Arc<dyn MetricsClient>)
    }

    fn producer(&self, brokers: &str) -> anyhow::Result<Option<Arc<dyn MessageProducer>>> {
        self.brokers.lock().push(brokers.to_string());
        Ok(Some(self.producer.clone() as Arc<dyn MessageProducer>))
    }

    fn key_value(&self, _url: &str) -> anyhow::Result<Option<Arc<dyn KeyValueStore>>> {
        Ok(Some(self.kv.clone() as Arc<dyn KeyValueStore>))
    }
}

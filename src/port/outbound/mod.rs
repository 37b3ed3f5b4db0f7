//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators a specialized host talks to:
//! metrics, message queue, key-value store, and the logging backend.

pub mod kv;
pub mod logging;
pub mod metrics;
pub mod provisioner;
pub mod queue;

pub use kv::KeyValueStore;
pub use logging::LogLevelControl;
pub use metrics::MetricsClient;
pub use provisioner::{ClientProvisioner, MetricsTarget};
pub use queue::{DeliveryHandle, MessageProducer, QueueRecord};

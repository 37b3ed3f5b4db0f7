//! Outbound adapters (driven side).

pub mod provisioner;
pub mod pushgateway;

pub use provisioner::{KeyValueFactory, ProducerFactory, StandardProvisioner};
pub use pushgateway::PushgatewayClient;

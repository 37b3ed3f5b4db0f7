//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`] - `ManualClock`, a cache clock advanced by hand.
//! - [`metrics`] - `RecordingMetrics`, keeps every counter sample.
//! - [`producer`] - `RecordingProducer`, keeps every sent record.
//! - [`kv`] - `MemoryKv`, an in-memory key-value store.
//! - [`log`] - `RecordingLogControl`, keeps every applied log level.
//! - [`provisioner`] - `FakeProvisioner`, hands out the recording doubles.
//! - [`host`] - `TestHost`, a controller and dispatcher wired to the doubles.

pub mod clock;
pub mod host;
pub mod kv;
pub mod log;
pub mod metrics;
pub mod producer;
pub mod provisioner;

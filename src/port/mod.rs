//! Trait definitions (hexagonal ports).
//!
//! Ports are the seams between the host core and everything the core treats
//! as an opaque collaborator.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!   HTTP surface ───▶│  Specialization +       │───▶ Metrics client
//!                    │  Dispatch (core)        │───▶ Message producer
//!   Entry point  ◀───│                         │───▶ Key-value store
//!                    └─────────────────────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`inbound::EntryPoint`], [`inbound::EntryPointResolver`] - User function seam
//! - [`outbound::MetricsClient`] - Counter emission
//! - [`outbound::MessageProducer`] - Queue publishing
//! - [`outbound::KeyValueStore`] - Key-value access
//! - [`outbound::ClientProvisioner`] - Builds the three clients above at specialization
//! - [`outbound::LogLevelControl`] - Applies the function's log verbosity

pub mod inbound;
pub mod outbound;

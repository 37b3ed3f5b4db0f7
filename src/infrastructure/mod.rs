//! Infrastructure layer.
//!
//! Technical concerns that support the host without containing its
//! behaviour: host configuration, logging, and runtime wiring.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root: builds the controller and serves HTTP
//! - [`config`] - Configuration loading, validation and logging setup

pub mod bootstrap;
pub mod config;

pub use config::Config;

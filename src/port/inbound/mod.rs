//! Inbound (driving) ports.
//!
//! # Modules
//!
//! - [`entry_point`]: The user function invoked per request and how it is resolved

pub mod entry_point;

pub use entry_point::{entry_fn, EntryPoint, EntryPointResolver, FnEntryPoint};

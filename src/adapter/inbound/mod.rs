//! Inbound adapters (driving side): the HTTP surface and the entry-point registry.

pub mod http;
pub mod registry;

pub use http::{router, AppState};
pub use registry::EntryPointRegistry;

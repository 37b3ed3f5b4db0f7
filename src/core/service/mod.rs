//! Host services: config resolution, specialization and request dispatch.
//!
//! - [`SpecializationController`] - One-shot transition to a specialized host
//! - [`RequestDispatcher`] - Invokes the entry point and records queue flow edges
//! - [`RequestContext`] - What the entry point sees per request
//! - [`ConfigResolver`] - Builds config and secret trees from mounted volumes
//! - [`RouterClient`] - Function-to-function calls through the router

pub mod config_resolver;
pub mod context;
pub mod dispatch;
pub mod outbound;
pub mod settings;
pub mod specialization;
pub mod state;

pub use config_resolver::{resolve_tree, ConfigResolver};
pub use context::RequestContext;
pub use dispatch::RequestDispatcher;
pub use outbound::{OutboundCall, RouterClient, FLOW_SOURCE_HEADER, FLOW_SOURCE_TYPE_HEADER};
pub use settings::{ClientSetting, FunctionSettings, HostDefaults};
pub use specialization::{HostOptions, SpecializationController};
pub use state::{CacheValue, Clients, HostState};

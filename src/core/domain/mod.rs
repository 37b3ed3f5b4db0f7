//! Core domain types for flowhost.
//!
//! ## Identity and Metadata
//!
//! - [`FunctionIdentity`] - Namespace and name the host is bound to
//! - [`SpecializeRequest`] - Payload of a specialization call
//! - [`HandlerSpec`] - Parsed `module.function` handler string
//!
//! ## Configuration
//!
//! - [`ConfigTree`] - Nested config/secret values with `global`/`local` aliases
//! - [`LogLevel`] - Function log verbosity
//!
//! ## Requests and Telemetry
//!
//! - [`InboundRequest`] / [`FunctionResponse`] - What an entry point consumes and returns
//! - [`FlowEdge`] - One hop in the platform call graph

mod config_tree;
mod flow;
mod handler;
mod identity;
mod level;
mod metadata;
mod request;

pub use config_tree::{
    ConfigNode, ConfigTree, GLOBAL_ALIAS, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_MAP, LOCAL_ALIAS,
};
pub use flow::{FlowEdge, Labels, UNKNOWN_CODE};
pub use handler::{HandlerSpec, DEFAULT_FUNCTION, DEFAULT_MODULE};
pub use identity::{FunctionIdentity, NODE_TYPE_FUNC, NODE_TYPE_KAFKA};
pub use level::{LogLevel, UnknownLogLevel};
pub use metadata::{FunctionMetadata, ManagedField, SpecializeRequest, UNKNOWN_UPDATE_TIME};
pub use request::{FunctionResponse, InboundRequest, ERROR_TOPIC_HEADER, RESPONSE_TOPIC_HEADER};

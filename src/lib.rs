//! Flowhost - a generic function execution host.
//!
//! A host starts generic, is specialized exactly once with a user function
//! and that function's resolved configuration, and then serves requests by
//! invoking the function. Hops from functions to message queue topics are
//! recorded as flow-edge counter samples.
//!
//! # Architecture
//!
//! - **`core::domain`** - Identity, metadata, config trees, flow edges
//! - **`core::cache`** - Pod-lifetime TTL cache with stale fallback
//! - **`core::service`** - Config resolution, specialization, dispatch
//! - **`port`** - Entry-point seam and collaborator capabilities
//! - **`adapter`** - HTTP surface, entry-point registry, Pushgateway client
//! - **`infrastructure`** - Host configuration, logging, runtime wiring
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//! - [`testkit`] - Test doubles (requires `testkit` feature)
//!
//! # Features
//!
//! - `testkit` - Expose recording test doubles for integration tests
//!
//! # Example
//!
//! ```no_run
//! use flowhost::adapter::inbound::EntryPointRegistry;
//! use flowhost::core::domain::FunctionResponse;
//! use flowhost::port::inbound::entry_fn;
//!
//! let registry = EntryPointRegistry::new().register(
//!     "hello.main",
//!     entry_fn(|_ctx, _req| async { Ok(FunctionResponse::ok("hello")) }),
//! );
//! ```

pub mod adapter;
pub mod cli;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

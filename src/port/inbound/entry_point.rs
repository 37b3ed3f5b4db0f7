//! Entry point port.
//!
//! An entry point is the user-authored callable a host is specialized with.
//! It is resolved once from a code path and handler string by an
//! [`EntryPointResolver`] and then invoked once per inbound request.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::domain::{FunctionResponse, HandlerSpec, InboundRequest};
use crate::core::service::context::RequestContext;
use crate::error::EntryPointError;

/// A user function bound to the host.
#[async_trait]
pub trait EntryPoint: Send + Sync {
    /// Handle one request. An error is reported to the caller as a failure.
    async fn invoke(
        &self,
        ctx: RequestContext,
        request: InboundRequest,
    ) -> anyhow::Result<FunctionResponse>;
}

/// Turns a code path and handler into an invocable entry point.
pub trait EntryPointResolver: Send + Sync {
    /// Resolve `handler` for the code deployed at `code_path`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryPointError::NotFound`] when nothing answers to the handler.
    fn resolve(
        &self,
        code_path: &Path,
        handler: &HandlerSpec,
    ) -> Result<Arc<dyn EntryPoint>, EntryPointError>;
}

/// Entry point backed by an async closure.
pub struct FnEntryPoint<F>(F);

/// Wrap an async closure as an [`EntryPoint`].
pub fn entry_fn<F, Fut>(f: F) -> FnEntryPoint<F>
where
    F: Fn(RequestContext, InboundRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FunctionResponse>> + Send + 'static,
{
    FnEntryPoint(f)
}

#[async_trait]
impl<F, Fut> EntryPoint for FnEntryPoint<F>
where
    F: Fn(RequestContext, InboundRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<FunctionResponse>> + Send + 'static,
{
    async fn invoke(
        &self,
        ctx: RequestContext,
        request: InboundRequest,
    ) -> anyhow::Result<FunctionResponse> {
        (self.0)(ctx, request).await
    }
}

//! Request dispatcher.
//!
//! Binds each inbound request to the specialized host: builds the
//! [`RequestContext`], runs the entry point to completion on its own task,
//! and records the queue flow edge named by the trigger headers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures_util::FutureExt;
use tracing::{debug, error, info_span, Instrument};
use uuid::Uuid;

use crate::core::domain::{FlowEdge, FunctionResponse, InboundRequest};
use crate::error::DispatchError;

use super::context::RequestContext;
use super::specialization::SpecializationController;

/// Routes inbound requests to the bound entry point.
#[derive(Clone)]
pub struct RequestDispatcher {
    controller: Arc<SpecializationController>,
}

impl RequestDispatcher {
    pub fn new(controller: Arc<SpecializationController>) -> Self {
        Self { controller }
    }

    /// Invoke the entry point for `request`.
    ///
    /// On success, a non-empty response-topic header records one edge to
    /// that topic. On failure, a non-empty error-topic header records one
    /// edge to that topic before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotSpecialized`] without invoking anything
    /// when the host is not specialized, and [`DispatchError::Function`] when
    /// the entry point fails or panics.
    pub async fn dispatch(&self, request: InboundRequest) -> Result<FunctionResponse, DispatchError> {
        let Some(state) = self.controller.state() else {
            error!(method = %request.method, uri = %request.uri, "request before specialization");
            return Err(DispatchError::NotSpecialized);
        };

        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            %request_id,
            method = %request.method,
            uri = %request.uri,
        );

        async move {
            let response_topic = request.response_topic().map(str::to_owned);
            let error_topic = request.error_topic().map(str::to_owned);
            let ctx = RequestContext::new(request_id, Arc::clone(&state));
            let entry_point = Arc::clone(state.entry_point());

            // Spawned so a dropped connection cannot cancel a running function.
            let invocation = tokio::spawn(
                async move {
                    AssertUnwindSafe(entry_point.invoke(ctx, request))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| Err(anyhow!("entry point panicked: {}", panic_message(&*payload))))
                }
                .in_current_span(),
            );

            let outcome = invocation
                .await
                .unwrap_or_else(|e| Err(anyhow!("entry point task failed: {e}")));

            match outcome {
                Ok(response) => {
                    debug!(status = response.status.as_u16(), "entry point returned");
                    if let Some(topic) = response_topic {
                        state
                            .emit_flow_edge(&FlowEdge::function_to_topic(state.identity(), &topic))
                            .await;
                    }
                    Ok(response)
                }
                Err(e) => {
                    error!(error = %format!("{e:#}"), "entry point failed");
                    if let Some(topic) = error_topic {
                        state
                            .emit_flow_edge(&FlowEdge::function_to_topic(state.identity(), &topic))
                            .await;
                    }
                    Err(DispatchError::Function(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

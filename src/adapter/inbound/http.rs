//! HTTP surface of the host.
//!
//! | Route | Method | Effect |
//! |---|---|---|
//! | `/specialize` | POST | legacy specialization, body ignored |
//! | `/v2/specialize` | POST | specialization from a JSON payload |
//! | `/healthz` | GET | liveness, always 200 |
//! | `/` | GET POST PUT HEAD OPTIONS DELETE | dispatch to the entry point |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, warn};

use crate::core::domain::{FunctionResponse, InboundRequest, SpecializeRequest};
use crate::core::service::{RequestDispatcher, SpecializationController};
use crate::error::{DispatchError, SpecializationError};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    controller: Arc<SpecializationController>,
    dispatcher: RequestDispatcher,
}

impl AppState {
    pub fn new(controller: Arc<SpecializationController>) -> Self {
        let dispatcher = RequestDispatcher::new(Arc::clone(&controller));
        Self {
            controller,
            dispatcher,
        }
    }
}

/// Build the host router.
pub fn router(controller: Arc<SpecializationController>) -> Router {
    Router::new()
        .route("/specialize", post(specialize_legacy))
        .route("/v2/specialize", post(specialize))
        .route("/healthz", get(healthz))
        .route(
            "/",
            get(dispatch)
                .post(dispatch)
                .put(dispatch)
                .head(dispatch)
                .options(dispatch)
                .delete(dispatch),
        )
        .with_state(AppState::new(controller))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn specialize_legacy(State(state): State<AppState>) -> Response {
    match state.controller.specialize_legacy().await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => specialization_failure(&e),
    }
}

async fn specialize(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SpecializeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed specialization payload");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match state.controller.specialize(request).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => specialization_failure(&e),
    }
}

fn specialization_failure(error: &SpecializationError) -> Response {
    let status = match error {
        SpecializationError::AlreadySpecialized => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string()).into_response()
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = InboundRequest {
        method,
        uri,
        headers,
        body,
    };

    match state.dispatcher.dispatch(request).await {
        Ok(response) => into_http(response),
        Err(e @ DispatchError::NotSpecialized) => {
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(DispatchError::Function(e)) => {
            error!(error = %format!("{e:#}"), "request failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_http(response: FunctionResponse) -> Response {
    (response.status, response.headers, response.body).into_response()
}

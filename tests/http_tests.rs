//! The HTTP surface, driven in-process through the router.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use flowhost::core::domain::{FunctionResponse, ERROR_TOPIC_HEADER};
use flowhost::port::inbound::entry_fn;
use flowhost::testkit::host::TestHost;

fn echo_host() -> TestHost {
    TestHost::new(entry_fn(|_, request| async move {
        if request.body.as_ref() == b"fail" {
            anyhow::bail!("asked to fail");
        }
        Ok(FunctionResponse::ok(request.body))
    }))
}

fn specialize_body(namespace: &str, name: &str) -> Body {
    Body::from(
        json!({
            "filepath": "/userfunc/deployarchive",
            "functionName": "",
            "FunctionMetadata": {
                "namespace": namespace,
                "name": name,
                "managedFields": [{ "time": "2024-05-01T10:00:00Z" }]
            }
        })
        .to_string(),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn healthz_is_always_ok() {
    let host = echo_host();
    let app = host.router();

    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn root_before_specialization_is_server_error() {
    let host = echo_host();
    let app = host.router();

    let (status, _) = send(&app, post("/", Body::from("hi"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(host.invocations(), 0);
}

#[tokio::test]
async fn v2_specialize_then_dispatch() {
    let host = echo_host();
    let app = host.router();

    let (status, body) = send(&app, post("/v2/specialize", specialize_body("ns", "fn"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(
        host.controller.state().unwrap().update_time(),
        "2024-05-01T10:00:00Z"
    );

    let (status, body) = send(&app, post("/", Body::from("ping"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ping");
    assert_eq!(host.invocations(), 1);
}

#[tokio::test]
async fn every_dispatch_method_reaches_the_function() {
    let host = echo_host();
    let app = host.router();
    send(&app, post("/v2/specialize", specialize_body("ns", "fn"))).await;

    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::HEAD,
        Method::OPTIONS,
        Method::DELETE,
    ] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK, "{method}");
    }
    assert_eq!(host.invocations(), 6);
}

#[tokio::test]
async fn second_specialization_conflicts() {
    let host = echo_host();
    let app = host.router();

    let (first, _) = send(&app, post("/v2/specialize", specialize_body("ns", "fn"))).await;
    let (second, _) = send(&app, post("/v2/specialize", specialize_body("ns", "other"))).await;
    let (legacy, _) = send(&app, post("/specialize", Body::empty())).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(legacy, StatusCode::CONFLICT);
    assert_eq!(host.controller.state().unwrap().identity().name(), "fn");
}

#[tokio::test]
async fn missing_namespace_fails_specialization() {
    let host = echo_host();
    let app = host.router();

    let (status, body) = send(&app, post("/v2/specialize", specialize_body("", "fn"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("namespace"));
    assert!(!host.controller.is_specialized());
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let host = echo_host();
    let app = host.router();

    let (status, _) = send(&app, post("/v2/specialize", Body::from("{not json"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!host.controller.is_specialized());
}

#[tokio::test]
async fn legacy_specialize_ignores_body() {
    let host = echo_host();
    let app = host.router();

    let (status, body) = send(&app, post("/specialize", Body::from("ignored"))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(
        host.controller.state().unwrap().handler().to_string(),
        "user.main"
    );
}

#[tokio::test]
async fn function_error_is_server_error_after_telemetry() {
    let host = echo_host();
    let app = host.router();
    send(&app, post("/v2/specialize", specialize_body("ns", "fn"))).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(ERROR_TOPIC_HEADER, "errors")
        .body(Body::from("fail"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let samples = host.metrics.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].labels["destination"], "kafka.errors");
}

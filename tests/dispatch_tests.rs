//! Request dispatch: flow-edge telemetry, the publish helper, outbound calls
//! and the per-request context.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::State;
use axum::http::{header, HeaderMap as ServerHeaders, StatusCode as ServerStatus};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{any, get};
use axum::Router;
use http::{HeaderName, HeaderValue, Method, StatusCode, Uri};
use parking_lot::Mutex;
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

use flowhost::core::cache::StorePolicy;
use flowhost::core::domain::{
    FunctionResponse, InboundRequest, ERROR_TOPIC_HEADER, RESPONSE_TOPIC_HEADER,
};
use flowhost::core::service::OutboundCall;
use flowhost::error::{DispatchError, QueueError};
use flowhost::port::inbound::entry_fn;
use flowhost::port::outbound::QueueRecord;
use flowhost::testkit::host::{specialized_host, TestHost};

use support::fixtures::{write_global, write_local};

fn request() -> InboundRequest {
    InboundRequest::new(Method::GET, Uri::from_static("/"))
}

fn queue_configs() -> TempDir {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "kafka-enabled", "y");
    write_global(configs.path(), "kafka-broker-list", "broker:9092");
    configs
}

type Seen = Arc<Mutex<Vec<ServerHeaders>>>;

async fn record_headers(State(seen): State<Seen>, headers: ServerHeaders) -> impl IntoResponse {
    seen.lock().push(headers);
    (ServerStatus::ACCEPTED, "from target")
}

/// Stand-in for the platform router on a random local port.
async fn spawn_router() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/redirect", get(|| async { Redirect::temporary("/final") }))
        .route("/final", get(|| async { "final" }))
        .route("/:namespace/:name", any(record_headers))
        .with_state(Arc::clone(&seen));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

#[tokio::test]
async fn request_before_specialization_invokes_nothing() {
    let host = TestHost::new(entry_fn(|_, _| async { Ok(FunctionResponse::ok("")) }));

    let err = host.dispatcher.dispatch(request()).await.unwrap_err();

    assert!(matches!(err, DispatchError::NotSpecialized));
    assert_eq!(host.invocations(), 0);
    assert!(host.metrics.samples().is_empty());
}

#[tokio::test]
async fn response_topic_edge_uses_flow_metric_name() {
    let host = specialized_host(entry_fn(|_, _| async { Ok(FunctionResponse::ok("done")) })).await;

    host.dispatcher
        .dispatch(request().with_header(RESPONSE_TOPIC_HEADER, "T"))
        .await
        .unwrap();

    let samples = host.metrics.samples();
    assert_eq!(samples.len(), 1);
    let sample = &samples[0];
    assert_eq!(sample.increment, 1.0);
    assert_eq!(sample.name_override.as_deref(), Some("fission_flow_recorder_by_env"));
    assert_eq!(sample.labels["source"], "func.ns.fn");
    assert_eq!(sample.labels["destination"], "kafka.T");
    assert_eq!(sample.labels["stype"], "func");
    assert_eq!(sample.labels["dtype"], "kafka");
    assert_eq!(sample.labels["method"], "kafka");
    assert_eq!(sample.labels["code"], "unknown");
}

#[tokio::test]
async fn error_topic_edge_then_error_reaches_caller() {
    let host = specialized_host(entry_fn(|_, _| async { Err(anyhow!("user failure")) })).await;

    let err = host
        .dispatcher
        .dispatch(request().with_header(ERROR_TOPIC_HEADER, "E"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("user failure"));
    let samples = host.metrics.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].labels["destination"], "kafka.E");
}

#[tokio::test]
async fn empty_topic_header_emits_nothing() {
    let host = specialized_host(entry_fn(|_, _| async { Err(anyhow!("user failure")) })).await;

    let _ = host
        .dispatcher
        .dispatch(request().with_header(ERROR_TOPIC_HEADER, ""))
        .await;

    assert!(host.metrics.samples().is_empty());
}

#[tokio::test]
async fn publish_sends_and_records_edge() {
    let configs = queue_configs();
    let host = TestHost::with_configs(
        entry_fn(|ctx, _| async move {
            let handle = ctx.publish(QueueRecord::new("audit").value("hello").key("k1")).await?;
            Ok(FunctionResponse::ok(format!("offset {}", handle.offset.unwrap_or(-1))))
        }),
        configs.path(),
    );
    host.specialize("ns", "fn").await.unwrap();

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert_eq!(response.body, "offset 0");
    let records = host.producer.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "audit");
    assert_eq!(records[0].value.as_deref(), Some(&b"hello"[..]));
    let samples = host.metrics.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].labels["destination"], "kafka.audit");
}

#[tokio::test]
async fn failed_publish_still_records_attempt() {
    let configs = queue_configs();
    let host = TestHost::with_configs(
        entry_fn(|ctx, _| async move {
            match ctx.publish(QueueRecord::new("audit").value("hello")).await {
                Ok(_) => Ok(FunctionResponse::ok("sent")),
                Err(e) => Ok(FunctionResponse::ok(format!("not sent: {e}"))),
            }
        }),
        configs.path(),
    );
    host.specialize("ns", "fn").await.unwrap();
    host.producer.fail_sends(true);

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert!(String::from_utf8_lossy(&response.body).starts_with("not sent"));
    assert_eq!(host.metrics.samples().len(), 1);
}

#[tokio::test]
async fn publish_without_producer_is_unavailable() {
    let host = specialized_host(entry_fn(|ctx, _| async move {
        let err = ctx.publish(QueueRecord::new("audit")).await.unwrap_err();
        Ok(FunctionResponse::ok(
            if matches!(err, QueueError::Unavailable) { "unavailable" } else { "other" },
        ))
    }))
    .await;

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert_eq!(response.body, "unavailable");
    assert!(host.metrics.samples().is_empty());
}

#[tokio::test]
async fn telemetry_failure_never_fails_request() {
    let configs = queue_configs();
    let host = TestHost::with_configs(
        entry_fn(|ctx, _| async move {
            ctx.publish(QueueRecord::new("audit")).await?;
            Ok(FunctionResponse::ok("ok"))
        }),
        configs.path(),
    );
    host.specialize("ns", "fn").await.unwrap();
    host.metrics.fail_next(true);

    let response = host
        .dispatcher
        .dispatch(request().with_header(RESPONSE_TOPIC_HEADER, "T"))
        .await;

    assert_eq!(response.unwrap().status, StatusCode::OK);
    assert_eq!(host.metrics.samples().len(), 2);
}

#[tokio::test]
async fn context_exposes_config_and_secret_trees() {
    let configs = TempDir::new().unwrap();
    write_local(configs.path(), "ns", "fn", "greeting", "hello");
    let host = TestHost::with_configs(
        entry_fn(|ctx, _| async move {
            let greeting = ctx.configs().local_value("greeting").unwrap_or("none").to_string();
            let secret = ctx.secrets().local_value("token").unwrap_or("none").to_string();
            Ok(FunctionResponse::ok(format!("{greeting}/{secret}")))
        }),
        configs.path(),
    );
    host.specialize("ns", "fn").await.unwrap();

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert_eq!(response.body, "hello/none");
}

#[tokio::test]
async fn cache_outlives_requests() {
    let computes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computes);
    let host = specialized_host(entry_fn(move |ctx, _| {
        let counter = Arc::clone(&counter);
        async move {
            let cache = ctx.cache().ok_or_else(|| anyhow!("cache disabled"))?;
            let value = cache
                .store("answer", StorePolicy::ttl_secs(60), || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Some(json!(42))
                })
                .ok_or_else(|| anyhow!("no value"))?;
            FunctionResponse::json(&value).map_err(Into::into)
        }
    }))
    .await;

    for _ in 0..3 {
        let response = host.dispatcher.dispatch(request()).await.unwrap();
        assert_eq!(response.body, "42");
    }
    assert_eq!(computes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn outbound_call_carries_identity_headers() {
    let (router_url, seen) = spawn_router().await;
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "fission-router", &router_url);
    let host = TestHost::with_configs(
        entry_fn(|ctx, _| async move {
            let call = OutboundCall::post()
                .header(
                    HeaderName::from_static("x-fission-flow-source"),
                    HeaderValue::from_static("spoofed"),
                )
                .header(HeaderName::from_static("x-trace"), HeaderValue::from_static("t-1"))
                .body("payload");
            let response = ctx.call_function("shop", "cart", call).await?;
            let status = response.status();
            Ok(FunctionResponse::with_status(status, response.bytes().await?))
        }),
        configs.path(),
    );
    host.specialize("ns", "fn").await.unwrap();

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body, "from target");
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["x-fission-flow-source"], "func.ns.fn");
    assert_eq!(seen[0]["x-fission-flow-source-type"], "func");
    assert_eq!(seen[0]["x-trace"], "t-1");
    assert!(seen[0].get(header::HOST).is_some());
}

#[tokio::test]
async fn redirects_follow_for_get_but_not_head() {
    let (router_url, _seen) = spawn_router().await;
    let target = format!("{router_url}/redirect");
    let host = specialized_host(entry_fn(move |ctx, _| {
        let target = target.clone();
        async move {
            let get = ctx
                .call_function("", "", OutboundCall::get().url(target.clone()))
                .await?;
            let head = ctx
                .call_function("", "", OutboundCall::new(Method::HEAD).url(target))
                .await?;
            Ok(FunctionResponse::ok(format!(
                "{} {}",
                get.status().as_u16(),
                head.status().as_u16()
            )))
        }
    }))
    .await;

    let response = host.dispatcher.dispatch(request()).await.unwrap();

    assert_eq!(response.body, "200 307");
}

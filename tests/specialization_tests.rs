//! Specialization lifecycle: config resolution, client provisioning and the
//! one-shot transition.

mod support;

use std::sync::Arc;

use flowhost::core::domain::{FunctionResponse, LogLevel};
use flowhost::error::SpecializationError;
use flowhost::port::inbound::entry_fn;
use flowhost::testkit::host::{specialize_request, TestHost};
use tempfile::TempDir;

use support::fixtures::{write_global, write_local};

fn ok_entry() -> impl flowhost::port::inbound::EntryPoint {
    entry_fn(|_, _| async { Ok(FunctionResponse::ok("ok")) })
}

#[tokio::test]
async fn local_and_global_values_resolve_through_aliases() {
    let configs = TempDir::new().unwrap();
    write_local(configs.path(), "shop", "cart", "a", "1");
    write_global(configs.path(), "b", "2");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("shop", "cart").await.unwrap();

    assert_eq!(state.configs().local_value("a"), Some("1"));
    assert_eq!(state.configs().global_value("b"), Some("2"));
    assert!(state.secrets().is_empty());
}

#[tokio::test]
async fn local_value_shadows_global_for_settings() {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "logger_level", "warn");
    write_local(configs.path(), "ns", "fn", "logger_level", " error \n");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("ns", "fn").await.unwrap();

    assert_eq!(state.log_level(), LogLevel::Error);
    assert_eq!(host.log.applied(), vec![LogLevel::Error]);
}

#[tokio::test]
async fn unknown_log_level_falls_back_to_debug() {
    let configs = TempDir::new().unwrap();
    write_local(configs.path(), "ns", "fn", "logger_level", "verbose");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("ns", "fn").await.unwrap();

    assert_eq!(state.log_level(), LogLevel::Debug);
    assert_eq!(host.log.applied(), vec![LogLevel::Debug]);
}

#[tokio::test]
async fn optional_clients_follow_enable_switches() {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "kafka-enabled", "y");
    write_global(configs.path(), "kafka-broker-list", "broker-0:9092,broker-1:9092");
    write_local(configs.path(), "ns", "fn", "prometheus-enabled", "n");
    write_local(configs.path(), "ns", "fn", "podcache-enabled", "n");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("ns", "fn").await.unwrap();

    assert!(state.clients().metrics.is_none());
    assert!(state.clients().producer.is_some());
    assert!(state.clients().key_value.is_none());
    assert!(state.cache().is_none());
    assert_eq!(host.provisioner.brokers(), vec!["broker-0:9092,broker-1:9092"]);
}

#[tokio::test]
async fn enabled_client_without_address_stays_absent() {
    let configs = TempDir::new().unwrap();
    write_local(configs.path(), "ns", "fn", "redis-enabled", "y");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("ns", "fn").await.unwrap();

    assert!(state.clients().key_value.is_none());
}

#[tokio::test]
async fn metrics_target_carries_identity_and_update_time() {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "pushgateway-url", "http://gateway.monitoring:9091");
    let host = TestHost::with_configs(ok_entry(), configs.path());
    let mut request = specialize_request("ns", "fn");
    request.metadata.creation_timestamp = Some("2024-03-01T12:00:00Z".into());

    let state = host.controller.specialize(request).await.unwrap();

    let targets = host.provisioner.targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].pushgateway_url, "http://gateway.monitoring:9091");
    assert_eq!(targets[0].identity.metric_prefix(), "ns_fn");
    assert_eq!(targets[0].update_time, "2024-03-01T12:00:00Z");
    assert_eq!(state.update_time(), "2024-03-01T12:00:00Z");
}

#[tokio::test]
async fn router_settings_come_from_global_config() {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "fission-router", "http://router.internal");
    write_global(configs.path(), "fission-router-template", "{domain}/fn/{namespace}-{name}");
    write_global(configs.path(), "fission-flow", "flows_by_env");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.specialize("ns", "fn").await.unwrap();

    assert_eq!(state.router().url_for("a", "b"), "http://router.internal/fn/a-b");
    assert_eq!(state.flow_metric(), "flows_by_env");
}

#[tokio::test]
async fn provisioning_failure_aborts_specialization() {
    let host = TestHost::new(ok_entry());
    host.provisioner.fail_metrics(true);

    let err = host.specialize("ns", "fn").await.unwrap_err();

    assert!(matches!(
        err,
        SpecializationError::Provisioning { client: "metrics", .. }
    ));
    assert!(!host.controller.is_specialized());
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_config_entry_aborts_specialization() {
    let configs = TempDir::new().unwrap();
    std::os::unix::fs::symlink(configs.path().join("missing"), configs.path().join("dangling"))
        .unwrap();
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let err = host.specialize("ns", "fn").await.unwrap_err();

    assert!(matches!(err, SpecializationError::Config(_)));
    assert!(!host.controller.is_specialized());
}

#[tokio::test]
async fn concurrent_specializations_have_one_winner() {
    let host = Arc::new(TestHost::new(ok_entry()));

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.specialize("ns", &format!("fn{i}")).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(state) => winners.push(state.identity().name().to_string()),
            Err(SpecializationError::AlreadySpecialized) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(rejected, 7);
    assert_eq!(
        host.controller.state().unwrap().identity().name(),
        winners[0]
    );
}

#[tokio::test]
async fn legacy_path_provisions_nothing() {
    let configs = TempDir::new().unwrap();
    write_global(configs.path(), "b", "2");
    let host = TestHost::with_configs(ok_entry(), configs.path());

    let state = host.controller.specialize_legacy().await.unwrap();

    assert_eq!(state.handler().to_string(), "user.main");
    assert!(state.configs().is_empty());
    assert!(state.clients().metrics.is_none());
    assert!(host.provisioner.targets().is_empty());
    assert!(host.log.applied().is_empty());
}

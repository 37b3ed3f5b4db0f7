//! Prometheus Pushgateway metrics client.
//!
//! Keeps every counter series the function has touched and pushes the whole
//! group on each increment, in text exposition format, to
//! `{gateway}/metrics/job/{namespace}_{name}`. A `PUT` replaces the group,
//! so pushes are sent one at a time in recording order; the gateway never
//! sees an older snapshot after a newer one.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::core::domain::{FunctionIdentity, Labels};
use crate::error::TelemetryError;
use crate::port::outbound::{MetricsClient, MetricsTarget};

/// Label added to every sample.
pub const UPDATE_TIME_LABEL: &str = "update_time";

pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(5);

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Counter series keyed by metric name, then label set.
type Registry = BTreeMap<String, BTreeMap<Labels, f64>>;

/// Metrics client pushing one function's counters to a Pushgateway.
#[derive(Debug)]
pub struct PushgatewayClient {
    client: Client,
    endpoint: Url,
    prefix: String,
    update_time: String,
    series: Mutex<Registry>,
    push_gate: tokio::sync::Mutex<()>,
}

impl PushgatewayClient {
    /// Build a client for `target` with a bounded push timeout.
    ///
    /// A gateway address without a scheme is taken as plain HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway address is not a valid URL or the
    /// HTTP client cannot be initialised.
    pub fn new(target: &MetricsTarget, timeout: Duration) -> Result<Self, TelemetryError> {
        let endpoint = push_endpoint(&target.pushgateway_url, &target.identity)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            prefix: target.identity.metric_prefix(),
            update_time: target.update_time.clone(),
            series: Mutex::new(Registry::new()),
            push_gate: tokio::sync::Mutex::new(()),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Current value of a series, as last pushed.
    #[must_use]
    pub fn value(&self, metric: &str, labels: &Labels) -> Option<f64> {
        let mut labels = labels.clone();
        labels.insert(UPDATE_TIME_LABEL.to_string(), self.update_time.clone());
        self.series
            .lock()
            .get(metric)
            .and_then(|series| series.get(&labels))
            .copied()
    }

    fn metric_name(&self, name: &str, name_override: Option<&str>) -> String {
        match name_override {
            Some(full) => sanitize_metric_name(full),
            None => sanitize_metric_name(&format!("{}_{name}", self.prefix)),
        }
    }

    /// Apply the increment and render the group as it stands afterwards.
    fn record(&self, metric: String, labels: &Labels, increment: f64) -> String {
        let mut labels = labels.clone();
        labels.insert(UPDATE_TIME_LABEL.to_string(), self.update_time.clone());

        let mut series = self.series.lock();
        *series.entry(metric).or_default().entry(labels).or_insert(0.0) += increment;
        render(&series)
    }
}

#[async_trait]
impl MetricsClient for PushgatewayClient {
    async fn counter(
        &self,
        name: &str,
        labels: &Labels,
        increment: f64,
        name_override: Option<&str>,
    ) -> Result<(), TelemetryError> {
        let metric = self.metric_name(name, name_override);
        let _push = self.push_gate.lock().await;
        let body = self.record(metric.clone(), labels, increment);

        let response = self
            .client
            .put(self.endpoint.clone())
            .header(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %metric, status = status.as_u16(), "pushgateway rejected push");
            return Err(TelemetryError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(endpoint = %self.endpoint, %metric, increment, "counter pushed");
        Ok(())
    }
}

/// `{gateway}/metrics/job/{namespace}_{name}`.
///
/// # Errors
///
/// Returns [`TelemetryError::Endpoint`] if the address cannot be parsed.
pub fn push_endpoint(gateway: &str, identity: &FunctionIdentity) -> Result<Url, TelemetryError> {
    let base = if gateway.contains("://") {
        gateway.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", gateway.trim_end_matches('/'))
    };
    let raw = format!("{base}/metrics/job/{}", identity.metric_prefix());

    Url::parse(&raw).map_err(|e| TelemetryError::Endpoint {
        endpoint: raw.clone(),
        reason: e.to_string(),
    })
}

/// Map a name onto the Prometheus metric charset `[a-zA-Z_:][a-zA-Z0-9_:]*`.
#[must_use]
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for (metric, series) in registry {
        let _ = writeln!(out, "# TYPE {metric} counter");
        for (labels, value) in series {
            let rendered: Vec<String> = labels
                .iter()
                .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
                .collect();
            let _ = writeln!(out, "{metric}{{{}}} {value}", rendered.join(","));
        }
    }
    out
}

//! Outbound calls from a function to other functions through the router.
//!
//! Every call carries two identity headers naming the calling function so
//! the router can record the flow edge. Caller headers are merged in first
//! and the identity headers written last, so they can never be removed.

use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use crate::core::domain::{FunctionIdentity, NODE_TYPE_FUNC};
use crate::error::OutboundError;

/// Header naming the calling function, `func.{namespace}.{name}`.
pub const FLOW_SOURCE_HEADER: &str = "x-fission-flow-source";

/// Header naming the calling node type.
pub const FLOW_SOURCE_TYPE_HEADER: &str = "x-fission-flow-source-type";

/// Redirect hops followed when following is on.
const MAX_REDIRECTS: usize = 10;

/// An outbound call to another function.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub method: Method,
    /// Explicit target; bypasses the router template when set.
    pub url: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Explicit redirect behaviour; the method default applies when unset.
    pub follow_redirects: Option<bool>,
}

impl OutboundCall {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            url: None,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            follow_redirects: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, OutboundError> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    #[must_use]
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }
}

/// Redirect default per method: GET and OPTIONS follow, HEAD does not, and
/// any other method follows.
#[must_use]
pub fn follows_redirects(method: &Method, explicit: Option<bool>) -> bool {
    explicit.unwrap_or(*method != Method::HEAD)
}

/// Expand a router template for a target function.
#[must_use]
pub fn target_url(template: &str, domain: &str, namespace: &str, name: &str) -> String {
    template
        .replace("{domain}", domain)
        .replace("{namespace}", namespace)
        .replace("{name}", name)
}

/// Caller headers plus the two identity headers of `source`.
///
/// # Errors
///
/// Returns [`OutboundError::SourceHeader`] if the identity cannot be sent as
/// a header value.
pub fn flow_headers(source: &FunctionIdentity, caller: &HeaderMap) -> Result<HeaderMap, OutboundError> {
    let flow_source = source.flow_source();
    let value = HeaderValue::from_str(&flow_source)
        .map_err(|_| OutboundError::SourceHeader { value: flow_source.clone() })?;

    let mut headers = caller.clone();
    headers.insert(HeaderName::from_static(FLOW_SOURCE_HEADER), value);
    headers.insert(
        HeaderName::from_static(FLOW_SOURCE_TYPE_HEADER),
        HeaderValue::from_static(NODE_TYPE_FUNC),
    );
    Ok(headers)
}

/// HTTP client for function-to-function calls.
#[derive(Debug, Clone)]
pub struct RouterClient {
    following: Client,
    direct: Client,
    domain: String,
    template: String,
}

impl RouterClient {
    /// Build clients with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(
        domain: impl Into<String>,
        template: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OutboundError> {
        let following = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;
        let direct = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            following,
            direct,
            domain: domain.into(),
            template: template.into(),
        })
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// URL of a target function under this router.
    #[must_use]
    pub fn url_for(&self, namespace: &str, name: &str) -> String {
        target_url(&self.template, &self.domain, namespace, name)
    }

    /// Issue `call` to `namespace`/`name` on behalf of `source`.
    ///
    /// The response is returned as received, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the calling identity is not a
    /// valid header value, or the request cannot be sent.
    pub async fn call(
        &self,
        source: &FunctionIdentity,
        namespace: &str,
        name: &str,
        call: OutboundCall,
    ) -> Result<reqwest::Response, OutboundError> {
        let raw_url = call
            .url
            .clone()
            .unwrap_or_else(|| self.url_for(namespace, name));
        let url = Url::parse(&raw_url).map_err(|source| OutboundError::Url {
            url: raw_url.clone(),
            source,
        })?;

        let client = if follows_redirects(&call.method, call.follow_redirects) {
            &self.following
        } else {
            &self.direct
        };

        let headers = flow_headers(source, &call.headers)?;
        let mut request = client.request(call.method.clone(), url).headers(headers);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = call.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            debug!(url = %raw_url, status = status.as_u16(), "function call completed");
        } else {
            error!(url = %raw_url, status = status.as_u16(), "function call completed");
        }
        Ok(response)
    }
}

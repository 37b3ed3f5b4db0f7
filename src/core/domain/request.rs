//! Transport-neutral request and response values passed to entry points.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

/// Header naming the topic a successful result is published to.
pub const RESPONSE_TOPIC_HEADER: &str = "x-fission-mqtrigger-resptopic";

/// Header naming the topic a failure is published to.
pub const ERROR_TOPIC_HEADER: &str = "x-fission-mqtrigger-errortopic";

/// An inbound request as seen by the entry point.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(HeaderName::from_static(name), value);
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Header value as text, `None` when absent, empty or not visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    /// Topic named by the response-topic marker header.
    #[must_use]
    pub fn response_topic(&self) -> Option<&str> {
        self.header_str(RESPONSE_TOPIC_HEADER)
    }

    /// Topic named by the error-topic marker header.
    #[must_use]
    pub fn error_topic(&self) -> Option<&str> {
        self.header_str(ERROR_TOPIC_HEADER)
    }
}

/// What an entry point returns for a request.
#[derive(Debug, Clone)]
pub struct FunctionResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FunctionResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A 200 JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T: serde::Serialize>(value: &T) -> serde_json::Result<Self> {
        let mut response = Self::ok(serde_json::to_vec(value)?);
        response.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(response)
    }
}

impl Default for FunctionResponse {
    fn default() -> Self {
        Self::ok(Bytes::new())
    }
}

//! API error types.
//!
//! Every failed call surfaces as one [`ApiError`]. Each variant knows its
//! [`ErrorCategory`], the request-correlation id when the server sent one,
//! and the [`RequestTarget`] that failed.

use std::collections::HashMap;
use std::fmt;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

use crate::request::Method;

/// Response header carrying GitHub's request-correlation id.
pub const REQUEST_ID_HEADER: &str = "x-github-request-id";

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// The resource does not exist (HTTP 404, GraphQL `NOT_FOUND`).
    NotFound,
    /// The server refused the operation.
    InvalidOperation,
    /// Input was rejected before any request was made.
    InvalidArgument,
    /// Credentials are missing or insufficient (HTTP 401/403).
    PermissionDenied,
    /// The connection could not be established.
    ConnectionError,
    /// The call exceeded its timeout.
    OperationTimeout,
    /// The response could not be interpreted.
    InvalidData,
    /// Nothing more specific is known.
    Unspecified,
}

impl ErrorCategory {
    /// Stable name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::InvalidOperation => "InvalidOperation",
            Self::InvalidArgument => "InvalidArgument",
            Self::PermissionDenied => "PermissionDenied",
            Self::ConnectionError => "ConnectionError",
            Self::OperationTimeout => "OperationTimeout",
            Self::InvalidData => "InvalidData",
            Self::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportKind {
    /// The request or the response body timed out.
    Timeout,
    /// Connecting failed (refused, DNS, TLS handshake).
    Connect,
    /// The request could not be sent.
    Request,
    /// Reading or writing a body failed.
    Body,
    /// The response body could not be decoded.
    Decode,
    /// Any other client failure.
    Other,
}

impl TransportKind {
    /// Classify a reqwest error.
    pub fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else if err.is_request() {
            Self::Request
        } else {
            Self::Other
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Timeout => "request timed out",
            Self::Connect => "could not connect",
            Self::Request => "could not send request",
            Self::Body => "failed to transfer body",
            Self::Decode => "failed to decode response",
            Self::Other => "request failed",
        }
    }
}

/// The request a failure belongs to. Never carries the token.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTarget {
    /// HTTP method.
    pub method: Method,
    /// Full URL.
    pub url: String,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// HTTP API error with status code and message.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Non-success HTTP status.
    #[error("{message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Multi-line message combining status, API message, details and request id.
        message: String,
        /// `message` member of the API error body.
        api_message: Option<String>,
        /// `documentation_url` member of the API error body.
        documentation_url: Option<String>,
        /// Request-correlation id.
        request_id: Option<String>,
        /// Response headers.
        headers: HashMap<String, String>,
        /// The failed request.
        target: Box<RequestTarget>,
    },

    /// GraphQL errors returned with a successful HTTP status.
    #[error("{message}")]
    GraphQL {
        /// All reported errors, in server order.
        entries: Vec<GraphQLErrorEntry>,
        /// First error message plus request id.
        message: String,
        /// Request-correlation id.
        request_id: Option<String>,
        /// The failed request.
        target: Box<RequestTarget>,
    },

    /// Network/transport error.
    #[error("{message}")]
    Transport {
        /// Classified failure.
        kind: TransportKind,
        /// Message naming the request target.
        message: String,
        /// The failed request.
        target: Box<RequestTarget>,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// A successful response whose body could not be interpreted.
    #[error("{message}")]
    InvalidData {
        /// What was wrong with the body.
        message: String,
        /// Request-correlation id.
        request_id: Option<String>,
        /// The request that produced the body.
        target: Box<RequestTarget>,
        /// Underlying parse error.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),
}

/// A single GraphQL error entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLErrorEntry {
    /// Error message.
    pub message: String,
    /// Error type (if provided).
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Path to the field that caused the error.
    pub path: Option<Vec<Value>>,
}

impl GraphQLErrorEntry {
    /// Build an entry from an error value that does not have the usual shape.
    pub fn from_unstructured(value: &Value) -> Self {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), str::to_string);
        Self {
            message,
            error_type: value.get("type").and_then(Value::as_str).map(str::to_string),
            path: None,
        }
    }
}

impl ApiError {
    /// Build the error for a non-success HTTP response.
    pub fn from_http_response(
        status: StatusCode,
        headers: &HeaderMap,
        body_text: &str,
        target: RequestTarget,
    ) -> Self {
        let request_id = header_str(headers, REQUEST_ID_HEADER);
        let body: Option<Value> = serde_json::from_str(body_text).ok();
        let field = |name: &str| {
            body.as_ref()
                .and_then(|b| b.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let api_message = field("message");
        let documentation_url = field("documentation_url");

        let mut lines = vec![format!(
            "HTTP {} ({}) from {target}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
        )];
        match (&api_message, &documentation_url) {
            (Some(msg), Some(url)) => lines.push(format!("{msg} | {url}")),
            (Some(msg), None) => lines.push(msg.clone()),
            (None, Some(url)) => lines.push(url.clone()),
            (None, None) => {}
        }
        let details: Vec<String> = ["errors", "details"]
            .iter()
            .filter_map(|name| body.as_ref()?.get(*name))
            .flat_map(detail_lines)
            .collect();
        if api_message.is_none()
            && documentation_url.is_none()
            && details.is_empty()
            && !body_text.trim().is_empty()
        {
            lines.push(body_text.trim().to_string());
        }
        lines.extend(details);
        if let Some(ref id) = request_id {
            lines.push(format!("RequestId: {id}"));
        }

        Self::Http {
            status: status.as_u16(),
            message: lines.join("\n"),
            api_message,
            documentation_url,
            request_id,
            headers: extract_header_map(headers),
            target: Box::new(target),
        }
    }

    /// Build the error for a GraphQL response carrying `errors`.
    pub fn graphql(
        entries: Vec<GraphQLErrorEntry>,
        request_id: Option<String>,
        target: RequestTarget,
    ) -> Self {
        let mut message = entries
            .first()
            .map_or_else(|| "GraphQL request failed".to_string(), |e| e.message.clone());
        if let Some(ref id) = request_id {
            message.push_str(&format!("\nRequestId: {id}"));
        }
        Self::GraphQL {
            entries,
            message,
            request_id,
            target: Box::new(target),
        }
    }

    /// Wrap a transport failure.
    pub fn transport(source: reqwest::Error, target: RequestTarget) -> Self {
        let kind = TransportKind::from_error(&source);
        Self::Transport {
            kind,
            message: format!("{} for {target}: {source}", kind.describe()),
            target: Box::new(target),
            source,
        }
    }

    /// Wrap a body that is not valid JSON.
    pub fn invalid_json(
        source: serde_json::Error,
        request_id: Option<String>,
        target: RequestTarget,
    ) -> Self {
        let mut message = format!("failed to parse response from {target}: {source}");
        if let Some(ref id) = request_id {
            message.push_str(&format!("\nRequestId: {id}"));
        }
        Self::InvalidData {
            message,
            request_id,
            target: Box::new(target),
            source: Some(source),
        }
    }

    /// Classification used for control flow and telemetry.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { status: 404, .. } => ErrorCategory::NotFound,
            Self::Http {
                status: 401 | 403, ..
            } => ErrorCategory::PermissionDenied,
            Self::Http { .. } => ErrorCategory::InvalidOperation,
            Self::GraphQL { entries, .. } => {
                match entries.first().and_then(|e| e.error_type.as_deref()) {
                    Some("NOT_FOUND") => ErrorCategory::NotFound,
                    Some(_) => ErrorCategory::InvalidOperation,
                    None => ErrorCategory::Unspecified,
                }
            }
            Self::Transport { kind, .. } => match kind {
                TransportKind::Timeout => ErrorCategory::OperationTimeout,
                TransportKind::Connect | TransportKind::Request => ErrorCategory::ConnectionError,
                TransportKind::Body | TransportKind::Decode => ErrorCategory::InvalidData,
                TransportKind::Other => ErrorCategory::Unspecified,
            },
            Self::InvalidData { .. } => ErrorCategory::InvalidData,
            Self::Validation(_) => ErrorCategory::InvalidArgument,
        }
    }

    /// Request-correlation id, when the server provided one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Http { request_id, .. }
            | Self::GraphQL { request_id, .. }
            | Self::InvalidData { request_id, .. } => request_id.as_deref(),
            Self::Transport { .. } | Self::Validation(_) => None,
        }
    }

    /// The request that failed, unless the error predates the request.
    pub fn target(&self) -> Option<&RequestTarget> {
        match self {
            Self::Http { target, .. }
            | Self::GraphQL { target, .. }
            | Self::Transport { target, .. }
            | Self::InvalidData { target, .. } => Some(target),
            Self::Validation(_) => None,
        }
    }

    /// HTTP status code for HTTP errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this is a not-found failure (HTTP 404 or GraphQL `NOT_FOUND`).
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Check if this is a 401 Unauthorized error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Check if this is a rate-limit error (429, or 403 with no remaining quota).
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Http { status: 429, .. } => true,
            Self::Http {
                status: 403,
                headers,
                ..
            } => headers
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v == "0"),
            _ => false,
        }
    }
}

/// Render an `errors` or `details` member, whatever its shape.
fn detail_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(format_detail).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", scalar(value)))
            .collect(),
        other => vec![format_detail(other)],
    }
}

fn scalar(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_string)
}

fn format_detail(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["resource", "field", "code", "message"]
            .iter()
            .filter_map(|key| {
                map.get(*key).map(|value| format!("{key}: {}", scalar(value)))
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Read a header as a string.
pub(crate) fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Extract response headers into a `HashMap<String, String>`.
pub(crate) fn extract_header_map(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (key, value) in headers {
        if let Ok(v) = value.to_str() {
            map.insert(key.to_string(), v.to_string());
        }
    }
    map
}

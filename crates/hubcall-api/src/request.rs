//! Request descriptors handed to the invoker.
//!
//! Commands build a fresh [`RequestDescriptor`] (REST) or [`GraphQLRequest`]
//! per call; nothing here is persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Map, Value};

use crate::errors::ApiError;

/// HTTP method of a REST call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Whether the method changes server state and may carry a body.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Post | Self::Patch | Self::Put)
    }

    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(ApiError::Validation(format!("invalid HTTP method: {other}"))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Patch => Self::PATCH,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Opt-in telemetry for one call.
///
/// Nothing is reported unless `event_name` is set.
#[derive(Debug, Clone, Default)]
pub struct TelemetryOptions {
    /// Event emitted after the call.
    pub event_name: Option<String>,
    /// Properties attached to the event; scrubbed before reporting.
    pub properties: BTreeMap<String, String>,
    /// Bucket for failure reports; falls back to the event name.
    pub exception_bucket: Option<String>,
}

/// Everything needed to make one REST call.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// Path and query relative to the API root, or an absolute URL.
    pub uri_fragment: String,
    /// HTTP method.
    pub method: Method,
    /// JSON body.
    pub body: Option<Value>,
    /// `Accept` header override for preview or versioned media types.
    pub accept: Option<String>,
    /// Token for this call only; wins over the configured token.
    pub access_token: Option<SecretString>,
    /// Timeout for this call; falls back to the configured timeout.
    pub timeout: Option<Duration>,
    /// Return status, headers and body together instead of the bare body.
    pub extended_result: bool,
    /// Human-readable label used in logs.
    pub description: Option<String>,
    /// Telemetry opt-in.
    pub telemetry: TelemetryOptions,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `uri_fragment`.
    pub fn new(method: Method, uri_fragment: impl Into<String>) -> Self {
        Self {
            uri_fragment: uri_fragment.into(),
            method,
            ..Self::default()
        }
    }

    /// `GET uri_fragment`.
    pub fn get(uri_fragment: impl Into<String>) -> Self {
        Self::new(Method::Get, uri_fragment)
    }

    /// `POST uri_fragment` with a JSON body.
    pub fn post(uri_fragment: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, uri_fragment).with_body(body)
    }

    /// `PATCH uri_fragment` with a JSON body.
    pub fn patch(uri_fragment: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, uri_fragment).with_body(body)
    }

    /// `PUT uri_fragment`, body optional.
    pub fn put(uri_fragment: impl Into<String>) -> Self {
        Self::new(Method::Put, uri_fragment)
    }

    /// `DELETE uri_fragment`.
    pub fn delete(uri_fragment: impl Into<String>) -> Self {
        Self::new(Method::Delete, uri_fragment)
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the `Accept` header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Use an explicit token for this call, if one is given.
    #[must_use]
    pub fn with_token(mut self, token: Option<&SecretString>) -> Self {
        self.access_token = token.cloned();
        self
    }

    /// Set the call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request the extended result shape.
    #[must_use]
    pub fn extended(mut self) -> Self {
        self.extended_result = true;
        self
    }

    /// Label the call in logs.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Emit a telemetry event named `event_name` after the call.
    #[must_use]
    pub fn with_telemetry_event(mut self, event_name: impl Into<String>) -> Self {
        self.telemetry.event_name = Some(event_name.into());
        self
    }

    /// Attach a telemetry property.
    #[must_use]
    pub fn with_telemetry_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.telemetry.properties.insert(key.into(), value.into());
        self
    }

    /// Group failure reports under `bucket`.
    #[must_use]
    pub fn with_exception_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.telemetry.exception_bucket = Some(bucket.into());
        self
    }

    /// Reject descriptors that cannot be sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an empty fragment or a body on a
    /// non-mutating method.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.uri_fragment.trim().is_empty() {
            return Err(ApiError::Validation(
                "uri fragment must not be empty".to_string(),
            ));
        }
        if self.body.is_some() && !self.method.is_mutating() {
            return Err(ApiError::Validation(format!(
                "a {} request cannot carry a body",
                self.method
            )));
        }
        Ok(())
    }
}

/// A GraphQL query or mutation document.
#[derive(Debug, Clone, Default)]
pub struct GraphQLRequest {
    /// Query or mutation text.
    pub query: String,
    /// Variables referenced by the document.
    pub variables: Map<String, Value>,
    /// Token for this call only.
    pub access_token: Option<SecretString>,
    /// Timeout for this call.
    pub timeout: Option<Duration>,
    /// Human-readable label used in logs.
    pub description: Option<String>,
    /// Telemetry opt-in.
    pub telemetry: TelemetryOptions,
}

impl GraphQLRequest {
    /// Create a request for `query` with no variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Bind a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Use an explicit token for this call, if one is given.
    #[must_use]
    pub fn with_token(mut self, token: Option<&SecretString>) -> Self {
        self.access_token = token.cloned();
        self
    }

    /// Set the call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Label the call in logs.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Emit a telemetry event named `event_name` after the call.
    #[must_use]
    pub fn with_telemetry_event(mut self, event_name: impl Into<String>) -> Self {
        self.telemetry.event_name = Some(event_name.into());
        self
    }

    /// The JSON document posted to the endpoint.
    pub fn body(&self) -> Value {
        serde_json::json!({
            "query": self.query,
            "variables": self.variables,
        })
    }

    /// Reject an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the query is blank.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.query.trim().is_empty() {
            return Err(ApiError::Validation(
                "GraphQL query must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_should_default_to_get() {
        let req = RequestDescriptor::get("repos/o/r/branches");
        assert_eq!(req.method, Method::Get);
        assert!(req.body.is_none());
        assert!(!req.extended_result);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_should_reject_empty_fragment() {
        let err = RequestDescriptor::get("  ").validate().unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[rstest]
    #[case(Method::Get, false)]
    #[case(Method::Delete, false)]
    #[case(Method::Post, true)]
    #[case(Method::Patch, true)]
    #[case(Method::Put, true)]
    fn test_should_only_allow_bodies_on_mutating_methods(
        #[case] method: Method,
        #[case] allowed: bool,
    ) {
        let req = RequestDescriptor::new(method, "user").with_body(serde_json::json!({}));
        assert_eq!(req.validate().is_ok(), allowed);
    }

    #[test]
    fn test_should_allow_put_without_body() {
        assert!(RequestDescriptor::put("user/starred/o/r").validate().is_ok());
    }

    #[rstest]
    #[case("get", Method::Get)]
    #[case("POST", Method::Post)]
    #[case("Patch", Method::Patch)]
    #[case("put", Method::Put)]
    #[case("delete", Method::Delete)]
    fn test_should_parse_method(#[case] input: &str, #[case] expected: Method) {
        assert_eq!(input.parse::<Method>().unwrap(), expected);
    }

    #[test]
    fn test_should_reject_unknown_method() {
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_should_build_with_options() {
        let token = SecretString::from("ghp_explicit".to_string());
        let req = RequestDescriptor::post("repos/o/r/labels", serde_json::json!({"name": "bug"}))
            .with_accept("application/vnd.github.symmetra-preview+json")
            .with_token(Some(&token))
            .with_timeout(Some(Duration::from_secs(3)))
            .with_telemetry_event("NewLabel")
            .with_telemetry_property("OwnerName", "o")
            .extended();

        assert_eq!(req.method, Method::Post);
        assert_eq!(
            req.access_token.as_ref().map(ExposeSecret::expose_secret),
            Some("ghp_explicit")
        );
        assert_eq!(req.telemetry.event_name.as_deref(), Some("NewLabel"));
        assert_eq!(req.telemetry.properties.get("OwnerName").map(String::as_str), Some("o"));
        assert!(req.extended_result);
    }

    #[test]
    fn test_should_build_graphql_body() {
        let req = GraphQLRequest::new("query($login: String!) { user(login: $login) { id } }")
            .with_variable("login", serde_json::json!("octocat"));
        let body = req.body();
        assert_eq!(body["variables"]["login"], "octocat");
        assert!(body["query"].as_str().unwrap().contains("user(login"));
        assert!(GraphQLRequest::new("").validate().is_err());
    }
}

//! Shared request/response plumbing.
//!
//! Every command funnels through [`Invoker`]: one REST call
//! ([`Invoker::invoke`]), a Link-paginated REST call
//! ([`Invoker::invoke_multipage`]) or a GraphQL document
//! ([`Invoker::graphql`]). Calls are sequential and never retried.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use hubcall_core::{Settings, instance};

use crate::auth::resolve_token;
use crate::errors::{
    ApiError, GraphQLErrorEntry, REQUEST_ID_HEADER, RequestTarget, extract_header_map, header_str,
};
use crate::http::{self, HttpClientOptions};
use crate::pagination;
use crate::request::{GraphQLRequest, Method, RequestDescriptor, TelemetryOptions};
use crate::telemetry::{TelemetryEvent, TelemetrySink, TracingTelemetry, scrub_properties};

/// One REST response with its transport details.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct RestResponse {
    /// HTTP status code.
    pub status: u16,
    /// `X-GitHub-Request-Id`, if sent.
    pub request_id: Option<String>,
    /// Next page to fetch, if any.
    pub next_link: Option<String>,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Parsed body; `null` for empty bodies.
    pub body: Value,
}

impl RestResponse {
    /// The extended-result JSON shape.
    pub fn into_extended_json(self) -> Value {
        serde_json::json!({
            "result": self.body,
            "statusCode": self.status,
            "requestId": self.request_id,
            "nextLink": self.next_link,
            "headers": self.headers,
        })
    }
}

/// GitHub API invoker bound to one [`Settings`] value.
#[derive(Clone)]
pub struct Invoker {
    http: reqwest::Client,
    graphql_http: reqwest::Client,
    settings: Arc<Settings>,
    telemetry: Arc<dyn TelemetrySink>,
    /// Optional base URL override for testing (e.g., `"http://127.0.0.1:PORT/"`).
    base_url_override: Option<String>,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("api_host_name", &self.settings.api_host_name)
            .field("telemetry", &self.telemetry)
            .field("base_url_override", &self.base_url_override)
            .finish_non_exhaustive()
    }
}

impl Invoker {
    /// Build an invoker with production HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(settings: Settings, app_version: &str) -> anyhow::Result<Self> {
        let rest_options = HttpClientOptions::rest(app_version);
        let http = http::build_client(&rest_options)?;
        let graphql_http = http::build_client(&rest_options.for_graphql())?;
        Ok(Self::from_parts(http, graphql_http, settings))
    }

    /// Assemble an invoker from prepared clients.
    pub fn from_parts(
        http: reqwest::Client,
        graphql_http: reqwest::Client,
        settings: Settings,
    ) -> Self {
        Self {
            http,
            graphql_http,
            settings: Arc::new(settings),
            telemetry: Arc::new(TracingTelemetry),
            base_url_override: None,
        }
    }

    /// Replace the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Route REST and GraphQL calls to `url` (with trailing slash) instead of
    /// the configured host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    /// Settings this invoker reads.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full URL for a fragment. Absolute URLs pass through unchanged.
    pub fn rest_url(&self, fragment: &str) -> String {
        if fragment.starts_with("https://") || fragment.starts_with("http://") {
            return fragment.to_string();
        }
        let base = match self.base_url_override {
            Some(ref url) => url.clone(),
            None => instance::rest_url(&self.settings.api_host_name),
        };
        format!("{base}{}", fragment.trim_start_matches('/'))
    }

    /// GraphQL endpoint URL.
    pub fn graphql_url(&self) -> String {
        match self.base_url_override {
            Some(ref base) => format!("{base}graphql"),
            None => instance::graphql_url(&self.settings.api_host_name),
        }
    }

    /// Execute one REST call and return the response with its status and headers.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure, transport failure, a
    /// non-success status, or a body that is not JSON.
    pub async fn send(&self, req: &RequestDescriptor) -> Result<RestResponse, ApiError> {
        let started = Instant::now();
        let outcome = self.execute(req, &self.rest_url(&req.uri_fragment)).await;
        self.report(&req.telemetry, started, outcome.as_ref().err(), None);
        outcome
    }

    /// Execute one REST call.
    ///
    /// Returns the parsed body, or the extended-result object when
    /// `req.extended_result` is set.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn invoke(&self, req: &RequestDescriptor) -> Result<Value, ApiError> {
        let resp = self.send(req).await?;
        if req.extended_result {
            Ok(resp.into_extended_json())
        } else {
            Ok(resp.body)
        }
    }

    /// Execute a REST call and follow `rel="next"` links, concatenating pages.
    ///
    /// Array pages are flattened in order; any other page body contributes
    /// one element. A failing page aborts the walk and pages already
    /// fetched are discarded. A next link to a page already fetched ends
    /// the walk.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered on any page.
    pub async fn invoke_multipage(&self, req: &RequestDescriptor) -> Result<Vec<Value>, ApiError> {
        let started = Instant::now();
        let mut items = Vec::new();
        let mut url = self.rest_url(&req.uri_fragment);
        let mut page = 1_u32;
        let mut visited = HashSet::new();

        let outcome = loop {
            visited.insert(url.clone());
            let resp = match self.execute(req, &url).await {
                Ok(resp) => resp,
                Err(e) => break Err(e),
            };
            let before = items.len();
            match resp.body {
                Value::Array(values) => items.extend(values),
                Value::Null => {}
                other => items.push(other),
            }
            debug!(page, received = items.len() - before, total = items.len(), "Fetched page");

            match resp.next_link {
                Some(next) if visited.contains(&next) => {
                    warn!(page, next = %next, "Next link repeats a fetched page, stopping");
                    break Ok(());
                }
                Some(next) => {
                    url = next;
                    page += 1;
                }
                None => break Ok(()),
            }
        };

        self.report(
            &req.telemetry,
            started,
            outcome.as_ref().err(),
            Some(items.len()),
        );
        outcome.map(|()| items)
    }

    /// Execute a paginated REST call and deserialize every element.
    ///
    /// # Errors
    ///
    /// See [`invoke_multipage`](Self::invoke_multipage); also fails if an
    /// element does not match `T`.
    pub async fn invoke_all<T: DeserializeOwned>(
        &self,
        req: &RequestDescriptor,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.rest_url(&req.uri_fragment);
        self.invoke_multipage(req)
            .await?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    ApiError::invalid_json(e, None, target_for(req.method, &url, req.body.as_ref()))
                })
            })
            .collect()
    }

    /// Execute a GraphQL document and return its `data` member.
    ///
    /// A response carrying a non-empty `errors` array fails even with
    /// HTTP 200.
    ///
    /// # Errors
    ///
    /// Returns an error on validation, transport or HTTP failure, when the
    /// response reports GraphQL errors, or when it has no `data`.
    pub async fn graphql(&self, req: &GraphQLRequest) -> Result<Value, ApiError> {
        let started = Instant::now();
        let outcome = self.execute_graphql(req).await;
        self.report(&req.telemetry, started, outcome.as_ref().err(), None);
        outcome
    }

    /// Execute a GraphQL document and deserialize its `data` member.
    ///
    /// # Errors
    ///
    /// See [`graphql`](Self::graphql); also fails if `data` does not match `T`.
    pub async fn graphql_as<T: DeserializeOwned>(
        &self,
        req: &GraphQLRequest,
    ) -> Result<T, ApiError> {
        let data = self.graphql(req).await?;
        serde_json::from_value(data).map_err(|e| {
            ApiError::invalid_json(e, None, target_for(Method::Post, &self.graphql_url(), None))
        })
    }

    async fn execute(&self, req: &RequestDescriptor, url: &str) -> Result<RestResponse, ApiError> {
        req.validate()?;
        let target = target_for(req.method, url, req.body.as_ref());
        let token = resolve_token(req.access_token.as_ref(), self.settings.access_token());

        debug!(
            method = %req.method,
            url,
            description = req.description.as_deref().unwrap_or_default(),
            authenticated = token.is_some(),
            "Invoking REST API"
        );

        let mut builder = self.http.request(req.method.into(), url);
        builder = self.apply_common(builder, token, req.timeout);
        if let Some(ref accept) = req.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(ref body) = req.body {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                ApiError::Validation(format!("request body cannot be serialized: {e}"))
            })?;
            if self.settings.log_request_body {
                debug!(body = %String::from_utf8_lossy(&bytes), "Request body");
            }
            builder = builder
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(bytes);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(e, target.clone()))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(e, target.clone()))?;

        if !status.is_success() {
            let err = ApiError::from_http_response(status, &headers, &text, target);
            warn!(status = status.as_u16(), request_id = err.request_id().unwrap_or_default(), "GitHub API call failed");
            return Err(err);
        }

        let request_id = header_str(&headers, REQUEST_ID_HEADER);
        let body = parse_body(&text).map_err(|e| ApiError::invalid_json(e, request_id.clone(), target))?;

        Ok(RestResponse {
            status: status.as_u16(),
            request_id,
            next_link: pagination::next_page_link(&headers),
            headers: extract_header_map(&headers),
            body,
        })
    }

    async fn execute_graphql(&self, req: &GraphQLRequest) -> Result<Value, ApiError> {
        req.validate()?;
        let url = self.graphql_url();
        let body = req.body();
        let target = target_for(Method::Post, &url, Some(&body));
        let token = resolve_token(req.access_token.as_ref(), self.settings.access_token());

        debug!(
            url,
            description = req.description.as_deref().unwrap_or_default(),
            authenticated = token.is_some(),
            "Invoking GraphQL API"
        );
        if self.settings.log_request_body {
            debug!(body = %body, "Request body");
        }

        let builder = self.apply_common(self.graphql_http.post(&url), token, req.timeout);
        let resp = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::transport(e, target.clone()))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(e, target.clone()))?;

        if !status.is_success() {
            return Err(ApiError::from_http_response(status, &headers, &text, target));
        }

        let request_id = header_str(&headers, REQUEST_ID_HEADER);
        let parsed =
            parse_body(&text).map_err(|e| ApiError::invalid_json(e, request_id.clone(), target.clone()))?;
        interpret_graphql_response(parsed, request_id, target)
    }

    fn apply_common(
        &self,
        mut builder: reqwest::RequestBuilder,
        token: Option<&SecretString>,
        timeout: Option<Duration>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, http::auth_header_value(token.expose_secret()));
        }
        if let Some(timeout) = timeout.or_else(|| self.settings.timeout()) {
            builder = builder.timeout(timeout);
        }
        builder
    }

    fn report(
        &self,
        options: &TelemetryOptions,
        started: Instant,
        error: Option<&ApiError>,
        num_items: Option<usize>,
    ) {
        let Some(ref event_name) = options.event_name else {
            return;
        };
        if self.settings.disable_telemetry {
            return;
        }

        let properties = scrub_properties(&options.properties, self.settings.disable_pii_protection);
        let result = match error {
            None => {
                let mut metrics = BTreeMap::new();
                metrics.insert(
                    "duration_ms".to_string(),
                    started.elapsed().as_secs_f64() * 1000.0,
                );
                if let Some(n) = num_items {
                    #[allow(clippy::cast_precision_loss)]
                    metrics.insert("num_items".to_string(), n as f64);
                }
                self.telemetry.track_event(&TelemetryEvent {
                    name: event_name.clone(),
                    properties,
                    metrics,
                })
            }
            Some(err) => {
                let bucket = options.exception_bucket.as_deref().unwrap_or(event_name);
                self.telemetry.track_exception(err, bucket, &properties)
            }
        };

        if let Err(e) = result {
            warn!(event = %event_name, error = %e, "Dropping telemetry record");
        }
    }
}

/// Interpret a parsed GraphQL envelope.
///
/// # Errors
///
/// Returns [`ApiError::GraphQL`] when `errors` is non-empty and
/// [`ApiError::InvalidData`] when there is no `data` member.
pub fn interpret_graphql_response(
    body: Value,
    request_id: Option<String>,
    target: RequestTarget,
) -> Result<Value, ApiError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let entries = errors
            .iter()
            .map(|e| {
                serde_json::from_value::<GraphQLErrorEntry>(e.clone())
                    .unwrap_or_else(|_| GraphQLErrorEntry::from_unstructured(e))
            })
            .collect();
        let err = ApiError::graphql(entries, request_id, target);
        warn!(category = %err.category(), "GraphQL call reported errors");
        return Err(err);
    }

    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        _ => Err(ApiError::InvalidData {
            message: format!("GraphQL response from {target} has no data"),
            request_id,
            target: Box::new(target),
            source: None,
        }),
    }
}

fn parse_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    }
}

fn target_for(method: Method, url: &str, body: Option<&Value>) -> RequestTarget {
    RequestTarget {
        method,
        url: url.to_string(),
        body: body.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::ErrorCategory;

    fn invoker(settings: Settings) -> Invoker {
        Invoker::from_parts(reqwest::Client::new(), reqwest::Client::new(), settings)
    }

    fn gql_target() -> RequestTarget {
        target_for(Method::Post, "https://api.github.com/graphql", None)
    }

    #[test]
    fn test_should_resolve_rest_url_absolute() {
        let inv = invoker(Settings::default());
        assert_eq!(
            inv.rest_url("https://api.example.com/custom?page=2"),
            "https://api.example.com/custom?page=2"
        );
    }

    #[test]
    fn test_should_resolve_rest_url_relative() {
        let inv = invoker(Settings::default());
        assert_eq!(
            inv.rest_url("/repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
    }

    #[test]
    fn test_should_resolve_enterprise_urls() {
        let mut settings = Settings::default();
        settings.api_host_name = "ghe.example.com".to_string();
        let inv = invoker(settings);
        assert_eq!(
            inv.rest_url("repos/owner/repo"),
            "https://ghe.example.com/api/v3/repos/owner/repo"
        );
        assert_eq!(inv.graphql_url(), "https://ghe.example.com/api/v3/graphql");
    }

    #[test]
    fn test_should_use_base_url_override() {
        let inv = invoker(Settings::default()).with_base_url("http://127.0.0.1:9/");
        assert_eq!(inv.rest_url("user"), "http://127.0.0.1:9/user");
        assert_eq!(inv.graphql_url(), "http://127.0.0.1:9/graphql");
    }

    #[test]
    fn test_should_not_leak_token_in_debug() {
        let mut settings = Settings::default();
        settings.set_access_token("ghp_supersecret");
        let inv = invoker(settings);
        assert!(!format!("{inv:?}").contains("supersecret"));
    }

    #[test]
    fn test_should_return_graphql_data() {
        let body = serde_json::json!({"data": {"viewer": {"login": "octocat"}}});
        let data = interpret_graphql_response(body, None, gql_target()).unwrap();
        assert_eq!(data, serde_json::json!({"viewer": {"login": "octocat"}}));
    }

    #[test]
    fn test_should_ignore_empty_errors_array() {
        let body = serde_json::json!({"data": {"ok": true}, "errors": []});
        let data = interpret_graphql_response(body, None, gql_target()).unwrap();
        assert_eq!(data["ok"], true);
    }

    #[test]
    fn test_should_fail_on_graphql_errors_even_with_data() {
        let body = serde_json::json!({
            "data": {"repository": null},
            "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a Repository with the name 'o/missing'."}]
        });
        let err =
            interpret_graphql_response(body, Some("RID-1".to_string()), gql_target()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.to_string().contains("Could not resolve"));
        assert!(err.to_string().contains("RID-1"));
    }

    #[test]
    fn test_should_accept_unstructured_graphql_errors() {
        let body = serde_json::json!({"errors": ["something broke"]});
        let err = interpret_graphql_response(body, None, gql_target()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unspecified);
    }

    #[test]
    fn test_should_fail_without_data() {
        let body = serde_json::json!({"message": "weird"});
        let err = interpret_graphql_response(body, None, gql_target()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidData);
    }

    #[test]
    fn test_should_build_extended_json() {
        let resp = RestResponse {
            status: 204,
            request_id: Some("R".to_string()),
            next_link: None,
            headers: HashMap::new(),
            body: Value::Null,
        };
        let json = resp.into_extended_json();
        assert_eq!(json["statusCode"], 204);
        assert_eq!(json["requestId"], "R");
        assert!(json["result"].is_null());
    }

    #[test]
    fn test_should_parse_empty_body_as_null() {
        assert_eq!(parse_body("  ").unwrap(), Value::Null);
        assert!(parse_body("not json").is_err());
    }
}

#[cfg(test)]
mod wiremock_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;
    use crate::errors::ErrorCategory;
    use crate::telemetry::{MockTelemetrySink, TelemetryError};

    fn setup_invoker(server: &MockServer, settings: Settings) -> Invoker {
        Invoker::from_parts(reqwest::Client::new(), reqwest::Client::new(), settings)
            .with_base_url(format!("{}/", server.uri()))
    }

    fn authed_settings() -> Settings {
        let mut settings = Settings::default();
        settings.set_access_token("ghp_configured");
        settings
    }

    #[tokio::test]
    async fn test_should_send_user_agent_and_configured_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "token ghp_configured"))
            .and(header("User-Agent", "hubcall/test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"login": "octocat"})))
            .expect(1)
            .mount(&server)
            .await;

        let rest_options = HttpClientOptions::rest("test");
        let inv = Invoker::from_parts(
            http::build_client(&rest_options).unwrap(),
            http::build_client(&rest_options.for_graphql()).unwrap(),
            authed_settings(),
        )
        .with_base_url(format!("{}/", server.uri()));

        let result = inv.invoke(&RequestDescriptor::get("user")).await.unwrap();
        assert_eq!(result["login"], "octocat");
    }

    #[tokio::test]
    async fn test_should_prefer_explicit_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "token ghp_explicit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, authed_settings());
        let explicit = SecretString::from("ghp_explicit".to_string());
        inv.invoke(&RequestDescriptor::get("user").with_token(Some(&explicit)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_should_omit_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .respond_with(|req: &Request| {
                let status = if req.headers.contains_key("authorization") { 500 } else { 200 };
                ResponseTemplate::new(status).set_body_json(serde_json::json!({"ok": true}))
            })
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let result = inv.invoke(&RequestDescriptor::get("rate_limit")).await.unwrap();
        assert_eq!(result["ok"], true);
    }

    #[tokio::test]
    async fn test_should_send_accept_override_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/o/r/labels"))
            .and(header("Accept", "application/vnd.github.symmetra-preview+json"))
            .and(header("Content-Type", "application/json; charset=utf-8"))
            .and(body_json(serde_json::json!({"name": "Done"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 7, "name": "Done"})))
            .expect(1)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let req = RequestDescriptor::post("repos/o/r/labels", serde_json::json!({"name": "Done"}))
            .with_accept("application/vnd.github.symmetra-preview+json");
        let result = inv.invoke(&req).await.unwrap();
        assert_eq!(result["id"], 7);
    }

    #[tokio::test]
    async fn test_should_return_exactly_one_page_for_single_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 1}, {"id": 2}]))
                    .append_header("link", format!("<{}/items?page=2>; rel=\"next\"", server.uri())),
            )
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let result = inv.invoke(&RequestDescriptor::get("items")).await.unwrap();
        assert_eq!(result, serde_json::json!([{"id": 1}, {"id": 2}]));
    }

    #[tokio::test]
    async fn test_should_return_extended_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orgs/o/members/octocat"))
            .respond_with(ResponseTemplate::new(204).append_header("x-github-request-id", "ID-204"))
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let result = inv
            .invoke(&RequestDescriptor::get("orgs/o/members/octocat").extended())
            .await
            .unwrap();
        assert_eq!(result["statusCode"], 204);
        assert_eq!(result["requestId"], "ID-204");
        assert!(result["result"].is_null());
    }

    #[tokio::test]
    async fn test_should_reject_invalid_descriptor_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let req = RequestDescriptor::get("user").with_body(serde_json::json!({"x": 1}));
        let err = inv.invoke(&req).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[tokio::test]
    async fn test_should_fail_on_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html>")
                    .append_header("x-github-request-id", "BAD-JSON"),
            )
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let err = inv.invoke(&RequestDescriptor::get("user")).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidData);
        assert_eq!(err.request_id(), Some("BAD-JSON"));
    }

    #[tokio::test]
    async fn test_should_time_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let req = RequestDescriptor::get("slow").with_timeout(Some(Duration::from_millis(100)));
        let err = inv.invoke(&req).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::OperationTimeout);
        assert!(err.to_string().contains("/slow"));
    }

    #[tokio::test]
    async fn test_should_report_connection_refused() {
        let inv = Invoker::from_parts(reqwest::Client::new(), reqwest::Client::new(), Settings::default())
            .with_base_url("http://127.0.0.1:1/");
        let err = inv.invoke(&RequestDescriptor::get("user")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.category(), ErrorCategory::ConnectionError);
    }

    #[tokio::test]
    async fn test_should_follow_pages_until_no_next_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": 3}])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 1}, {"id": 2}]))
                    .append_header("link", format!("<{}/items?page=2>; rel=\"next\"", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let items = inv.invoke_multipage(&RequestDescriptor::get("items")).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_should_stop_when_next_link_points_to_page_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 1}]))
                    .append_header("link", format!("<{}/items?page=1>; rel=\"next\"", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let items = inv.invoke_multipage(&RequestDescriptor::get("items")).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_should_stop_when_next_link_repeats_a_fetched_page() {
        let server = MockServer::start().await;
        let page2 = format!("<{}/items?page=2>; rel=\"next\"", server.uri());
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 2}]))
                    .append_header("link", page2.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param_is_missing("page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 1}]))
                    .append_header("link", page2.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, Settings::default());
        let items = inv.invoke_multipage(&RequestDescriptor::get("items")).await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_should_emit_telemetry_with_duration_and_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
            .mount(&server)
            .await;

        let mut sink = MockTelemetrySink::new();
        sink.expect_track_event()
            .withf(|event| {
                event.name == "GetItems"
                    && event.metrics.contains_key("duration_ms")
                    && event.metrics.get("num_items") == Some(&2.0)
                    && event.properties.get("OwnerName").map(String::as_str)
                        == Some(hubcall_core::pii::pii_safe("octocat").as_str())
            })
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_track_exception().times(0);

        let inv = setup_invoker(&server, Settings::default()).with_telemetry(Arc::new(sink));
        let req = RequestDescriptor::get("items")
            .with_telemetry_event("GetItems")
            .with_telemetry_property("OwnerName", "octocat");
        inv.invoke_multipage(&req).await.unwrap();
    }

    #[tokio::test]
    async fn test_should_ignore_telemetry_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"login": "o"})))
            .mount(&server)
            .await;

        let mut sink = MockTelemetrySink::new();
        sink.expect_track_event()
            .returning(|_| Err(TelemetryError("collector unreachable".to_string())));

        let inv = setup_invoker(&server, Settings::default()).with_telemetry(Arc::new(sink));
        let result = inv
            .invoke(&RequestDescriptor::get("user").with_telemetry_event("GetUser"))
            .await
            .unwrap();
        assert_eq!(result["login"], "o");
    }

    #[tokio::test]
    async fn test_should_report_exception_under_bucket() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let mut sink = MockTelemetrySink::new();
        sink.expect_track_exception()
            .withf(|err, bucket, _| bucket == "GetMissing-Bucket" && err.is_not_found())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let inv = setup_invoker(&server, Settings::default()).with_telemetry(Arc::new(sink));
        let req = RequestDescriptor::get("missing")
            .with_telemetry_event("GetMissing")
            .with_exception_bucket("GetMissing-Bucket");
        let err = inv.invoke(&req).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_should_skip_telemetry_when_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let mut sink = MockTelemetrySink::new();
        sink.expect_track_event().times(0);
        let mut settings = Settings::default();
        settings.disable_telemetry = true;

        let inv = setup_invoker(&server, settings).with_telemetry(Arc::new(sink));
        inv.invoke(&RequestDescriptor::get("user").with_telemetry_event("GetUser"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_should_post_graphql_document() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("Authorization", "token ghp_configured"))
            .respond_with(move |req: &Request| {
                seen.fetch_add(1, Ordering::SeqCst);
                let body: Value = serde_json::from_slice(&req.body).unwrap_or_default();
                let login = body["variables"]["login"].clone();
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": {"user": {"login": login}}}))
            })
            .mount(&server)
            .await;

        let inv = setup_invoker(&server, authed_settings());
        let req = GraphQLRequest::new("query($login: String!) { user(login: $login) { login } }")
            .with_variable("login", serde_json::json!("octocat"));
        let data = inv.graphql(&req).await.unwrap();
        assert_eq!(data["user"]["login"], "octocat");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Shared test utilities for command testing.
//!
//! Provides a factory wired to a wiremock server plus helpers for mounting
//! the REST and GraphQL responses commands expect.

use hubcall_core::Settings;
use hubcall_core::output::TestOutput;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::factory::Factory;

/// Token the harness configures.
pub const TEST_TOKEN: &str = "ghp_test_token_123";

/// A fully-configured test harness with factory, output capture, and mock server.
#[derive(Debug)]
pub struct TestHarness {
    /// The factory configured for testing.
    pub factory: Factory,
    /// Captured stdout/stderr output.
    pub output: TestOutput,
    /// Wiremock mock server for API requests.
    pub server: MockServer,
}

impl TestHarness {
    /// Create a harness whose settings carry [`TEST_TOKEN`] and the default
    /// repository `owner/repo`.
    pub async fn new() -> Self {
        let mut settings = Settings::default();
        settings.set_access_token(TEST_TOKEN);
        settings.default_owner_name = Some("owner".to_string());
        settings.default_repository_name = Some("repo".to_string());
        Self::with_settings(settings).await
    }

    /// Create a test harness with custom settings.
    pub async fn with_settings(settings: Settings) -> Self {
        let server = MockServer::start().await;
        let (factory, output) = Factory::test();
        let factory = factory
            .with_http_client(reqwest::Client::new())
            .with_api_url(format!("{}/", server.uri()))
            .with_settings(settings);

        Self {
            factory,
            output,
            server,
        }
    }

    /// Get captured stdout as a string.
    pub fn stdout(&self) -> String {
        self.output.stdout()
    }

    /// Get captured stdout parsed as JSON.
    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap_or_else(|e| {
            panic!("stdout is not JSON ({e}): {}", self.stdout())
        })
    }

    /// Get captured stderr as a string.
    pub fn stderr(&self) -> String {
        self.output.stderr()
    }
}

// --- Wiremock helpers ---

/// Mount a GraphQL response mock that matches a query substring.
pub async fn mock_graphql(
    server: &MockServer,
    query_contains: &str,
    response_body: serde_json::Value,
) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains(query_contains))
        .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
        .mount(server)
        .await;
}

/// Mount a REST GET response mock for a specific path.
pub async fn mock_rest_get(server: &MockServer, url_path: &str, response_body: serde_json::Value) {
    mock_rest_get_status(server, url_path, 200, response_body).await;
}

/// Mount a REST GET response mock that returns a specific status code with a JSON body.
pub async fn mock_rest_get_status(
    server: &MockServer,
    url_path: &str,
    status: u16,
    response_body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .and(header("Authorization", format!("token {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(response_body))
        .mount(server)
        .await;
}

/// Mount a REST POST response mock for a specific path.
pub async fn mock_rest_post(
    server: &MockServer,
    url_path: &str,
    status: u16,
    response_body: serde_json::Value,
) {
    mock_rest_write(server, "POST", url_path, status, response_body).await;
}

/// Mount a REST PATCH response mock for a specific path.
pub async fn mock_rest_patch(
    server: &MockServer,
    url_path: &str,
    status: u16,
    response_body: serde_json::Value,
) {
    mock_rest_write(server, "PATCH", url_path, status, response_body).await;
}

/// Mount a REST PUT response mock for a specific path.
pub async fn mock_rest_put(
    server: &MockServer,
    url_path: &str,
    status: u16,
    response_body: serde_json::Value,
) {
    mock_rest_write(server, "PUT", url_path, status, response_body).await;
}

/// Mount a REST DELETE response mock for a specific path.
pub async fn mock_rest_delete(server: &MockServer, url_path: &str, status: u16) {
    Mock::given(method("DELETE"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mock_rest_write(
    server: &MockServer,
    http_method: &str,
    url_path: &str,
    status: u16,
    response_body: serde_json::Value,
) {
    Mock::given(method(http_method))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(status).set_body_json(response_body))
        .mount(server)
        .await;
}

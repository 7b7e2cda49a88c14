//! HTTP client construction.
//!
//! Transport policy (user agent, default `Accept`, minimum TLS version) is
//! fixed when a client is built. The GraphQL endpoint gets its own client
//! with a TLS floor instead of flipping a process-wide switch per call.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::tls;
use tracing::debug;

/// Default media type for REST calls.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// Minimum TLS version enforced on GraphQL calls.
pub const GRAPHQL_MIN_TLS: tls::Version = tls::Version::TLS_1_2;

/// Options for constructing an HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientOptions {
    /// Application version for User-Agent.
    pub app_version: String,
    /// Lowest TLS version the client will negotiate.
    pub min_tls_version: Option<tls::Version>,
}

impl HttpClientOptions {
    /// Options for REST calls.
    pub fn rest(app_version: &str) -> Self {
        Self {
            app_version: app_version.to_string(),
            min_tls_version: None,
        }
    }

    /// Options for GraphQL calls: same as `self` with the TLS floor applied.
    #[must_use]
    pub fn for_graphql(&self) -> Self {
        Self {
            min_tls_version: Some(GRAPHQL_MIN_TLS),
            ..self.clone()
        }
    }

    /// The User-Agent header value.
    pub fn user_agent(&self) -> String {
        format!("hubcall/{}", self.app_version)
    }
}

/// Build a reqwest client with default configuration.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_client(opts: &HttpClientOptions) -> anyhow::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&opts.user_agent())?,
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(version) = opts.min_tls_version {
        debug!(?version, "Enforcing minimum TLS version");
        builder = builder.min_tls_version(version);
    }

    Ok(builder.build()?)
}

/// Format an authorization header value from a token.
pub fn auth_header_value(token: &str) -> String {
    format!("token {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_rest_client() {
        assert!(build_client(&HttpClientOptions::rest("1.0.0")).is_ok());
    }

    #[test]
    fn test_should_build_graphql_client() {
        let opts = HttpClientOptions::rest("1.0.0").for_graphql();
        assert_eq!(opts.min_tls_version, Some(GRAPHQL_MIN_TLS));
        assert!(build_client(&opts).is_ok());
    }

    #[test]
    fn test_should_not_touch_rest_options_when_deriving_graphql() {
        let rest = HttpClientOptions::rest("1.0.0");
        let before = rest.clone();
        let _graphql = rest.for_graphql();
        assert_eq!(rest, before);
        assert!(rest.min_tls_version.is_none());
    }

    #[test]
    fn test_should_reject_invalid_user_agent() {
        let opts = HttpClientOptions::rest("bad\nversion");
        assert!(build_client(&opts).is_err());
    }

    #[test]
    fn test_should_format_auth_header() {
        assert_eq!(auth_header_value("ghp_abc123"), "token ghp_abc123");
        assert_eq!(HttpClientOptions::rest("2.1").user_agent(), "hubcall/2.1");
    }
}

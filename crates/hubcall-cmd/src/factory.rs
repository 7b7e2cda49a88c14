//! Factory for shared command dependencies.
//!
//! Loads [`Settings`] once, applies command-line overrides and hands out
//! [`Invoker`]s bound to them. Test mode swaps in captured output, an
//! in-memory settings value and a mock server URL.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use hubcall_api::{Invoker, NoopTelemetry, TelemetrySink};
use hubcall_core::config::{self, Settings};
use hubcall_core::output::{Output, TestOutput};

/// Token source label for `--token`.
const FLAG_TOKEN_SOURCE: &str = "--token";

/// Shared factory providing lazily-initialized dependencies to all commands.
pub struct Factory {
    /// Application version.
    pub app_version: String,
    /// Output streams.
    pub io: Output,
    settings: OnceLock<Settings>,
    test_mode: bool,

    config_dir_override: Option<PathBuf>,
    host_override: Option<String>,
    token_override: Option<String>,
    timeout_override: Option<u64>,
    http_override: Option<reqwest::Client>,
    api_url_override: Option<String>,
    telemetry_override: Option<Arc<dyn TelemetrySink>>,
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("app_version", &self.app_version)
            .field("test_mode", &self.test_mode)
            .field("api_url_override", &self.api_url_override)
            .finish_non_exhaustive()
    }
}

impl Factory {
    /// Create a factory bound to the process streams and the user's configuration.
    pub fn new(app_version: impl Into<String>) -> Self {
        Self::build(app_version.into(), Output::system(), false)
    }

    /// Create a test factory with captured output and default settings.
    ///
    /// The environment is never consulted for tokens and telemetry is
    /// dropped unless a sink is set with [`with_telemetry`](Self::with_telemetry).
    pub fn test() -> (Self, TestOutput) {
        let (io, output) = Output::test();
        let factory = Self::build("test".to_string(), io, true).with_telemetry(Arc::new(NoopTelemetry));
        (factory, output)
    }

    fn build(app_version: String, io: Output, test_mode: bool) -> Self {
        Self {
            app_version,
            io,
            settings: OnceLock::new(),
            test_mode,
            config_dir_override: None,
            host_override: None,
            token_override: None,
            timeout_override: None,
            http_override: None,
            api_url_override: None,
            telemetry_override: None,
        }
    }

    /// Read and write configuration files in `dir`.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir_override = Some(dir.into());
        self
    }

    /// Use `settings` instead of loading them.
    #[must_use]
    pub fn with_settings(self, settings: Settings) -> Self {
        let _ = self.settings.set(settings);
        self
    }

    /// Target `host` regardless of the configured host.
    #[must_use]
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host_override = host;
        self
    }

    /// Use `token` ahead of the environment and the stored token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token_override = token;
        self
    }

    /// Override the request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        self.timeout_override = seconds;
        self
    }

    /// Set a custom reqwest HTTP client (e.g., backed by wiremock).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_override = Some(client);
        self
    }

    /// Set an API URL override (wiremock server URI with trailing slash).
    ///
    /// When set, all API requests (REST and GraphQL) will be sent to
    /// this base URL instead of the real GitHub API.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url_override = Some(url.into());
        self
    }

    /// Report telemetry to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry_override = Some(sink);
        self
    }

    /// Directory holding `config.yml` and `hosts.yml`.
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir_override
            .clone()
            .unwrap_or_else(config::config_dir)
    }

    /// Effective settings, loading them on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration files cannot be read.
    pub fn settings(&self) -> anyhow::Result<&Settings> {
        if let Some(settings) = self.settings.get() {
            return Ok(settings);
        }
        let mut settings = if self.test_mode && self.config_dir_override.is_none() {
            Settings::default()
        } else {
            Settings::load_from(&self.config_dir()).context("failed to load configuration")?
        };
        if !self.test_mode {
            settings.apply_env_overrides();
        }
        self.apply_overrides(&mut settings);

        // Ignore set error - another thread may have set it first
        let _ = self.settings.set(settings);
        self.settings
            .get()
            .ok_or_else(|| anyhow::anyhow!("failed to initialize settings"))
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(ref host) = self.host_override {
            settings.api_host_name = hubcall_core::instance::normalize_hostname(host);
        }
        if let Some(seconds) = self.timeout_override {
            settings.web_request_timeout_sec = seconds;
        }
        if let Some(ref token) = self.token_override {
            settings.override_access_token(token, FLAG_TOKEN_SOURCE);
        }
    }

    /// Build an invoker over the effective settings.
    ///
    /// In test mode, uses the injected HTTP client and URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or a client cannot be built.
    pub fn invoker(&self) -> anyhow::Result<Invoker> {
        let settings = self.settings()?.clone();
        let mut invoker = match self.http_override {
            Some(ref client) => Invoker::from_parts(client.clone(), client.clone(), settings),
            None => Invoker::new(settings, &self.app_version)?,
        };
        if let Some(ref url) = self.api_url_override {
            invoker = invoker.with_base_url(url.clone());
        }
        if let Some(ref sink) = self.telemetry_override {
            invoker = invoker.with_telemetry(sink.clone());
        }
        Ok(invoker)
    }
}

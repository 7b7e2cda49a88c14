//! File-backed settings.
//!
//! `config.yml` holds plain settings; `hosts.yml` maps hostnames to tokens
//! so switching `api_host_name` picks up the matching credential.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{TOKEN_ENV_VARS, ValueKind, config_dir, default_for_key, option_for_key};
use crate::errors::ConfigError;
use crate::instance;

const CONFIG_FILE: &str = "config.yml";
const HOSTS_FILE: &str = "hosts.yml";

/// Process-wide configuration read by the invoker and the command layer.
///
/// Construct with [`Settings::default`] for an unconfigured, unauthenticated
/// setup against `github.com`, or with [`Settings::load`] to read the user's
/// configuration directory and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// GitHub host: `github.com` or an enterprise server hostname.
    pub api_host_name: String,
    /// Per-request timeout in seconds; `0` means no timeout.
    pub web_request_timeout_sec: u64,
    /// Log request bodies at debug level.
    pub log_request_body: bool,
    /// Skip result decoration in the command layer.
    pub disable_pipeline_support: bool,
    /// Do not emit telemetry.
    pub disable_telemetry: bool,
    /// Emit telemetry properties unhashed.
    pub disable_pii_protection: bool,
    /// Owner used when a command names no repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_owner_name: Option<String>,
    /// Repository used when a command names no repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repository_name: Option<String>,

    #[serde(skip)]
    host_tokens: HashMap<String, SecretString>,
    #[serde(skip)]
    token_override: Option<(SecretString, &'static str)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host_name: default_for_key("api_host_name").to_string(),
            web_request_timeout_sec: 0,
            log_request_body: false,
            disable_pipeline_support: false,
            disable_telemetry: false,
            disable_pii_protection: false,
            default_owner_name: None,
            default_repository_name: None,
            host_tokens: HashMap::new(),
            token_override: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HostEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    oauth_token: Option<String>,
}

impl Settings {
    /// Load settings from [`config_dir`] and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Self::load_from(&config_dir())?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Load settings from a specific directory, ignoring the environment.
    ///
    /// Missing or empty files yield defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let mut settings: Self = match read_optional(&dir.join(CONFIG_FILE))? {
            Some(content) => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            None => Self::default(),
        };
        settings.api_host_name = instance::normalize_hostname(&settings.api_host_name);

        if let Some(content) = read_optional(&dir.join(HOSTS_FILE))? {
            let hosts: HashMap<String, HostEntry> =
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            settings.host_tokens = hosts
                .into_iter()
                .filter_map(|(host, entry)| {
                    let token = entry.oauth_token.filter(|t| !t.is_empty())?;
                    Some((instance::normalize_hostname(&host), SecretString::from(token)))
                })
                .collect();
        }

        tracing::debug!(dir = %dir.display(), host = %settings.api_host_name, "loaded settings");
        Ok(settings)
    }

    /// Take a token from the first non-empty variable in [`TOKEN_ENV_VARS`].
    pub fn apply_env_overrides(&mut self) {
        self.token_override = TOKEN_ENV_VARS.iter().find_map(|name| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|v| (SecretString::from(v), *name))
        });
    }

    /// Use `token` ahead of any environment or stored token.
    ///
    /// An empty token leaves the current choice alone.
    pub fn override_access_token(&mut self, token: &str, source: &'static str) {
        if !token.is_empty() {
            self.token_override = Some((SecretString::from(token.to_string()), source));
        }
    }

    /// Write `config.yml` and `hosts.yml` into `dir`, creating it if needed.
    ///
    /// Environment-provided tokens are never persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or files cannot be written.
    pub fn save_to(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir).map_err(|e| ConfigError::WriteFile {
            path: dir.display().to_string(),
            source: e,
        })?;

        let config_yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        write_file(&dir.join(CONFIG_FILE), &config_yaml)?;

        let hosts: HashMap<&str, HostEntry> = self
            .host_tokens
            .iter()
            .map(|(host, token)| {
                (
                    host.as_str(),
                    HostEntry {
                        oauth_token: Some(token.expose_secret().to_string()),
                    },
                )
            })
            .collect();
        let hosts_yaml =
            serde_yaml::to_string(&hosts).map_err(|e| ConfigError::Parse(e.to_string()))?;
        write_file(&dir.join(HOSTS_FILE), &hosts_yaml)?;
        tracing::debug!(dir = %dir.display(), "saved settings");
        Ok(())
    }

    /// Save into [`config_dir`].
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_dir())
    }

    /// The configured default token for the current host.
    ///
    /// An environment token wins over the one stored in `hosts.yml`.
    pub fn access_token(&self) -> Option<&SecretString> {
        if let Some((ref token, _)) = self.token_override {
            return Some(token);
        }
        self.host_tokens
            .get(&instance::normalize_hostname(&self.api_host_name))
    }

    /// Where [`access_token`](Self::access_token) comes from, if anywhere.
    pub fn token_source(&self) -> Option<&'static str> {
        if let Some((_, name)) = self.token_override {
            return Some(name);
        }
        self.host_tokens
            .contains_key(&instance::normalize_hostname(&self.api_host_name))
            .then_some(HOSTS_FILE)
    }

    /// Store a token for the current host; an empty token removes it.
    pub fn set_access_token(&mut self, token: &str) {
        let host = instance::normalize_hostname(&self.api_host_name);
        if token.is_empty() {
            self.host_tokens.remove(&host);
        } else {
            self.host_tokens
                .insert(host, SecretString::from(token.to_string()));
        }
    }

    /// Request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.web_request_timeout_sec > 0).then(|| Duration::from_secs(self.web_request_timeout_sec))
    }

    /// Read a setting as a display string. Tokens are masked.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for unknown keys.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "api_host_name" => self.api_host_name.clone(),
            "web_request_timeout_sec" => self.web_request_timeout_sec.to_string(),
            "log_request_body" => self.log_request_body.to_string(),
            "disable_pipeline_support" => self.disable_pipeline_support.to_string(),
            "disable_telemetry" => self.disable_telemetry.to_string(),
            "disable_pii_protection" => self.disable_pii_protection.to_string(),
            "default_owner_name" => self.default_owner_name.clone().unwrap_or_default(),
            "default_repository_name" => self.default_repository_name.clone().unwrap_or_default(),
            "access_token" => self
                .access_token()
                .map(|t| mask_token(t.expose_secret()))
                .unwrap_or_default(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Validate and assign a setting.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or values of the wrong shape.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let option = option_for_key(key)?;
        let invalid = |expected: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        };

        match option.kind {
            ValueKind::Bool => {
                let flag: bool = value.parse().map_err(|_| invalid("true or false"))?;
                match key {
                    "log_request_body" => self.log_request_body = flag,
                    "disable_pipeline_support" => self.disable_pipeline_support = flag,
                    "disable_telemetry" => self.disable_telemetry = flag,
                    _ => self.disable_pii_protection = flag,
                }
            }
            ValueKind::Integer => {
                self.web_request_timeout_sec =
                    value.parse().map_err(|_| invalid("a non-negative integer"))?;
            }
            ValueKind::Text => {
                let text = (!value.is_empty()).then(|| value.to_string());
                match key {
                    "api_host_name" => {
                        if value.is_empty() {
                            return Err(invalid("a hostname"));
                        }
                        self.api_host_name = instance::normalize_hostname(value);
                    }
                    "default_owner_name" => self.default_owner_name = text,
                    _ => self.default_repository_name = text,
                }
            }
            ValueKind::Secret => self.set_access_token(value),
        }
        Ok(())
    }

    /// Restore a setting to its default value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for unknown keys.
    pub fn reset(&mut self, key: &str) -> Result<(), ConfigError> {
        let option = option_for_key(key)?;
        self.set(key, option.default_value)
    }
}

/// Mask a token for display, keeping the prefix up to the last underscore.
pub fn mask_token(token: &str) -> String {
    if let Some(idx) = token.rfind('_') {
        let prefix = &token[..=idx];
        let mask_len = token.len() - prefix.len();
        format!("{prefix}{}", "*".repeat(mask_len))
    } else {
        "*".repeat(token.len())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok((!content.trim().is_empty()).then_some(content))
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    fs::write(path, content).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })
}

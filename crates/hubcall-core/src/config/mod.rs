//! Configuration system for hubcall.
//!
//! Settings live in `config.yml` and tokens in `hosts.yml`, both inside
//! [`config_dir`]. The core only ever reads a [`Settings`] value handed to
//! it; loading, editing and saving happen here.

mod settings;

pub use settings::Settings;

use crate::errors::ConfigError;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "HUBCALL_CONFIG_DIR";

/// Environment variables consulted for a token, in precedence order.
pub const TOKEN_ENV_VARS: &[&str] = &["HUBCALL_TOKEN", "GH_TOKEN", "GITHUB_TOKEN"];

/// Configuration directory path (usually `~/.config/hubcall`).
pub fn config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return std::path::PathBuf::from(dir);
    }
    dirs::config_dir().map_or_else(
        || {
            dirs::home_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(".config")
                .join("hubcall")
        },
        |d| d.join("hubcall"),
    )
}

/// The shape of values a setting accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// `true` or `false`.
    Bool,
    /// A non-negative integer.
    Integer,
    /// Any string; empty clears the value.
    Text,
    /// A credential, never echoed back.
    Secret,
}

/// A known configuration option.
#[derive(Debug)]
pub struct ConfigOption {
    /// Config key name.
    pub key: &'static str,
    /// Description of what this option does.
    pub description: &'static str,
    /// Accepted value shape.
    pub kind: ValueKind,
    /// Default value.
    pub default_value: &'static str,
}

/// Known configuration keys with descriptions and defaults.
pub static CONFIG_OPTIONS: &[ConfigOption] = &[
    ConfigOption {
        key: "api_host_name",
        description: "the GitHub host to talk to (github.com or an enterprise server)",
        kind: ValueKind::Text,
        default_value: "github.com",
    },
    ConfigOption {
        key: "web_request_timeout_sec",
        description: "seconds before a request times out (0 disables the timeout)",
        kind: ValueKind::Integer,
        default_value: "0",
    },
    ConfigOption {
        key: "log_request_body",
        description: "log JSON request bodies at debug level",
        kind: ValueKind::Bool,
        default_value: "false",
    },
    ConfigOption {
        key: "disable_pipeline_support",
        description: "skip adding convenience properties to command results",
        kind: ValueKind::Bool,
        default_value: "false",
    },
    ConfigOption {
        key: "disable_telemetry",
        description: "stop emitting usage telemetry events",
        kind: ValueKind::Bool,
        default_value: "false",
    },
    ConfigOption {
        key: "disable_pii_protection",
        description: "send telemetry properties without hashing them",
        kind: ValueKind::Bool,
        default_value: "false",
    },
    ConfigOption {
        key: "default_owner_name",
        description: "owner used when a command is given no repository",
        kind: ValueKind::Text,
        default_value: "",
    },
    ConfigOption {
        key: "default_repository_name",
        description: "repository used when a command is given no repository",
        kind: ValueKind::Text,
        default_value: "",
    },
    ConfigOption {
        key: "access_token",
        description: "token used when a command is not given one explicitly",
        kind: ValueKind::Secret,
        default_value: "",
    },
];

/// Look up a known option by key.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownKey`] for keys not in [`CONFIG_OPTIONS`].
pub fn option_for_key(key: &str) -> Result<&'static ConfigOption, ConfigError> {
    CONFIG_OPTIONS
        .iter()
        .find(|o| o.key == key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
}

/// Default configuration value for a key, empty for unknown keys.
pub fn default_for_key(key: &str) -> &'static str {
    option_for_key(key).map_or("", |o| o.default_value)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::EnvVarGuard;

    #[rstest]
    #[case("api_host_name", "github.com")]
    #[case("web_request_timeout_sec", "0")]
    #[case("log_request_body", "false")]
    #[case("default_owner_name", "")]
    #[case("unknown_key", "")]
    #[case("", "")]
    fn test_should_return_defaults(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(default_for_key(key), expected);
    }

    #[test]
    fn test_should_reject_unknown_option() {
        let err = option_for_key("editor").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "editor"));
    }

    #[test]
    fn test_should_use_env_var_for_config_dir() {
        let _guard = EnvVarGuard::set(CONFIG_DIR_ENV, "/tmp/test-hubcall-config");
        assert_eq!(
            config_dir(),
            std::path::PathBuf::from("/tmp/test-hubcall-config")
        );
    }

    #[test]
    fn test_should_have_unique_option_keys() {
        let mut keys: Vec<_> = CONFIG_OPTIONS.iter().map(|o| o.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CONFIG_OPTIONS.len());
    }
}

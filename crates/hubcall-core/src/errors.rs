//! Core error types for hubcall.

/// Configuration-specific errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write config file.
    #[error("failed to write config file {path}: {source}")]
    WriteFile {
        /// Path of the config file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse config.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The key is not a known setting.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// The value is not acceptable for the key.
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Rejected value.
        value: String,
        /// Human-readable description of what is accepted.
        expected: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_config_error_parse() {
        let err = ConfigError::Parse("invalid yaml".to_string());
        assert_eq!(err.to_string(), "failed to parse config: invalid yaml");
    }

    #[test]
    fn test_should_display_config_error_read_file() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ConfigError::ReadFile {
            path: "/home/.config/hubcall/config.yml".to_string(),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/home/.config/hubcall/config.yml"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_should_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            key: "log_request_body".to_string(),
            value: "maybe".to_string(),
            expected: "true or false".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"maybe\" for log_request_body: expected true or false",
        );
    }
}

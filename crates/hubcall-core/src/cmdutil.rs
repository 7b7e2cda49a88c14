//! Command utility error types.
//!
//! The binary downcasts to these to pick an exit code.

/// Error indicating invalid or conflicting command input.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FlagError(pub String);

/// Error indicating the request was rejected for lack of credentials.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_flag_error() {
        let err = FlagError("specify only one of --first, --last or --after".to_string());
        assert!(err.to_string().contains("--first"));
    }

    #[test]
    fn test_should_downcast_from_anyhow() {
        let err: anyhow::Error = AuthError("bad credentials".to_string()).into();
        assert!(err.downcast_ref::<AuthError>().is_some());
        assert!(err.downcast_ref::<FlagError>().is_none());
    }
}

//! Effective-token resolution.

use secrecy::{ExposeSecret, SecretString};

/// Pick the token for a call.
///
/// An explicit non-empty token wins, then the configured default; `None`
/// means the call goes out unauthenticated.
pub fn resolve_token<'a>(
    explicit: Option<&'a SecretString>,
    configured: Option<&'a SecretString>,
) -> Option<&'a SecretString> {
    explicit
        .filter(|t| !t.expose_secret().is_empty())
        .or_else(|| configured.filter(|t| !t.expose_secret().is_empty()))
}

//! Scrubbing of personally identifiable values before they leave the process.

use sha2::{Digest, Sha256};

/// Hash a value so it can be correlated without being readable.
///
/// Returns the upper-case hex SHA-256 digest of the UTF-8 bytes.
pub fn pii_safe(value: &str) -> String {
    hex::encode_upper(Sha256::digest(value.as_bytes()))
}

/// Hash `value` unless protection is disabled.
pub fn scrub(value: &str, protection_disabled: bool) -> String {
    if protection_disabled {
        value.to_string()
    } else {
        pii_safe(value)
    }
}

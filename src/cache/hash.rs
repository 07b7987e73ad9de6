//! Hashing for cache keys.

use sha2::{Digest, Sha256};

/// Short stable prefix for one connection, derived from its fingerprint.
///
/// Connection strings may carry credentials; only the digest is stored.
pub fn connection_hash(fingerprint: &str) -> String {
    hex_digest(fingerprint.as_bytes())[..16].to_string()
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

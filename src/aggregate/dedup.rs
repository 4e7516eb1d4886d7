//! Content fingerprints for duplicate detection

use sha2::{Digest, Sha256};

/// SHA-256 of a cleaned page body, hex encoded
///
/// Only exact matches collide; near-duplicates keep distinct fingerprints.
pub fn content_fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.trim().as_bytes());
    hex::encode(hasher.finalize())
}

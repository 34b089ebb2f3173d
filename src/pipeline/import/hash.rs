use sha2::{Digest, Sha256};

/// SHA-256 of the stored bytes, lowercase hex.
pub fn content_checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

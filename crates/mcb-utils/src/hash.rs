//! Content hashing for change detection.

use sha2::{Digest, Sha256};

/// Compute a stable hex-encoded SHA-256 digest of file content.
///
/// Used by `File.content_hash` (§3) so re-indexing can skip files whose
/// bytes have not changed since the last run.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_hash_the_same() {
        assert_eq!(content_hash(b"SELECT 1"), content_hash(b"SELECT 1"));
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(content_hash(b"SELECT 1"), content_hash(b"SELECT 2"));
    }

    #[test]
    fn empty_input_is_well_defined() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

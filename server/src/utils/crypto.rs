//! Hashing helpers

use sha2::{Digest, Sha256};

/// SHA-256 of a string as lowercase hex
pub fn sha256_hex(data: &str) -> String {
    sha256_bytes_hex(data.as_bytes())
}

/// SHA-256 of raw bytes as lowercase hex
pub fn sha256_bytes_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex("hello"), sha256_bytes_hex(b"hello"));
    }
}

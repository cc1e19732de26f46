//! Integrity checksums for persisted cache envelopes.

use sha2::{Digest, Sha256};

/// Compute the checksum stored alongside a cache envelope.
///
/// The key is mixed in so an envelope copied under another key fails verification.
pub fn envelope_checksum(key: &str, envelope: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(b"\n");
    hasher.update(envelope.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check an envelope against its stored checksum.
pub fn verify_checksum(key: &str, envelope: &str, checksum: &str) -> bool {
    envelope_checksum(key, envelope).eq_ignore_ascii_case(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_stability() {
        let a = envelope_checksum("cachedRegions", r#"{"data":[],"timestamp":1}"#);
        let b = envelope_checksum("cachedRegions", r#"{"data":[],"timestamp":1}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn test_checksum_depends_on_key() {
        let a = envelope_checksum("cachedRegions", "{}");
        let b = envelope_checksum("cachedCities", "{}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_checksum_format() {
        let sum = envelope_checksum("k", "v");
        assert_eq!(sum.len(), 64);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_detects_tampering() {
        let sum = envelope_checksum("k", r#"{"data":["a"],"timestamp":5}"#);
        assert!(verify_checksum("k", r#"{"data":["a"],"timestamp":5}"#, &sum));
        assert!(!verify_checksum("k", r#"{"data":["b"],"timestamp":5}"#, &sum));
    }
}

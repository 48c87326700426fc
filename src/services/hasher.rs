//! Content fingerprinting.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `bytes`.
///
/// Pure and total: every input, including the empty slice, has a fingerprint.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn is_deterministic() {
        let payload = b"the same bytes twice";
        assert_eq!(fingerprint(payload), fingerprint(payload));
    }

    #[test]
    fn empty_input_has_known_digest() {
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn distinct_inputs_have_distinct_digests() {
        let corpus: Vec<Vec<u8>> = (0u16..512)
            .map(|n| n.to_le_bytes().to_vec())
            .chain([b"a".to_vec(), b"A".to_vec(), b"a ".to_vec(), Vec::new()])
            .collect();
        let digests: HashSet<String> = corpus.iter().map(|b| fingerprint(b)).collect();
        assert_eq!(digests.len(), corpus.len());
    }

    #[test]
    fn digest_is_lowercase_hex_of_sha256_length() {
        let digest = fingerprint(b"abc");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
}

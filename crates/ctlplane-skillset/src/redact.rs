//! 8-hex-char SHA-256 prefix redaction for hidden context values, grounded
//! on the teacher's `SchemaDigest::short()` (8-hex-prefix-of-a-hash
//! pattern), algorithm changed from blake3 to SHA-256 per the spec.

use sha2::{Digest, Sha256};

pub fn short_hash8(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest)[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_prefix() {
        // sha256("secret-password") = 4218... verify only the prefix length/shape.
        let hash = short_hash8("secret-password");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn deterministic() {
        assert_eq!(short_hash8("x"), short_hash8("x"));
        assert_ne!(short_hash8("x"), short_hash8("y"));
    }
}

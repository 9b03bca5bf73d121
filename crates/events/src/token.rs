//! Opaque confirmation tokens.
//!
//! The newsletter double-opt-in link carries a random token; only its
//! SHA-256 hash is stored server-side so a database leak does not let an
//! attacker confirm arbitrary addresses.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a random confirmation token.
///
/// Returns `(plaintext_token, sha256_hex_hash)`. The plaintext goes into
/// the email; only the hash should be persisted.
pub fn generate_confirmation_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_confirmation_token(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a confirmation token.
///
/// Use this to compare an incoming token against the stored hash.
pub fn hash_confirmation_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_hex() {
        let (plaintext, hash) = generate_confirmation_token();
        assert_eq!(hash_confirmation_token(&plaintext), hash);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_tokens_have_distinct_hashes() {
        let (_, a) = generate_confirmation_token();
        let (_, b) = generate_confirmation_token();
        assert_ne!(a, b);
    }
}

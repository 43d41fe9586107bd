//! Password hashing and the legacy base64 transport convention.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Bcrypt cost used in production. Tests pass a lower cost explicitly.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext secret with bcrypt (salted, slow, one-way).
pub fn hash(secret: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(secret, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext secret against a stored bcrypt hash.
pub fn verify(secret: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(secret, hash).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Unwrap a base64-wrapped plaintext, or return the input unchanged.
///
/// Clients historically send passwords either as plaintext or as base64 of
/// the plaintext. The rule is exact round-trip equality: the input is
/// treated as wrapped only when `encode(decode(s)) == s` and the decoded
/// bytes form valid UTF-8. This is a transport convention, not security.
pub fn decode_if_base64(text: &str) -> String {
    let Ok(bytes) = STANDARD.decode(text) else {
        return text.to_string();
    };
    if STANDARD.encode(&bytes) != text {
        return text.to_string();
    }
    match String::from_utf8(bytes) {
        Ok(decoded) => decoded,
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost keeps the suite fast; production uses BCRYPT_COST.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = hash("secret123", TEST_COST).unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(verify("secret123", &hashed).unwrap());
        assert!(!verify("wrong-password", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("secret123", TEST_COST).unwrap();
        let b = hash("secret123", TEST_COST).unwrap();
        assert_ne!(a, b);
        assert!(verify("secret123", &a).unwrap());
        assert!(verify("secret123", &b).unwrap());
    }

    #[test]
    fn base64_wrapped_input_is_unwrapped() {
        // "cGFzczEyMw==" is base64 of "pass123".
        assert_eq!(decode_if_base64("cGFzczEyMw=="), "pass123");
    }

    #[test]
    fn plain_input_passes_through() {
        assert_eq!(decode_if_base64("secret123"), "secret123");
        assert_eq!(decode_if_base64("not base64!"), "not base64!");
    }

    #[test]
    fn non_canonical_base64_passes_through() {
        // Decodes, but does not re-encode to itself (missing padding).
        assert_eq!(decode_if_base64("cGFzczEyMw"), "cGFzczEyMw");
    }

    #[test]
    fn wrapped_and_plain_verify_against_the_same_hash() {
        let stored = hash("secret123", TEST_COST).unwrap();
        let from_wrapped = decode_if_base64(&STANDARD.encode("secret123"));
        let from_plain = decode_if_base64("secret123");
        assert!(verify(&from_wrapped, &stored).unwrap());
        assert!(verify(&from_plain, &stored).unwrap());
    }

    #[test]
    fn non_utf8_payload_is_treated_as_plain() {
        let raw = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode_if_base64(&raw), raw);
    }
}

//! Credential primitives: PBKDF2 password hashing and opaque bearer
//! tokens. Plaintext tokens are returned to the caller once; only their
//! SHA-256 hashes are ever persisted.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

/// Hash a password with a fresh random salt. Returns (hash, salt), both
/// base64 for TEXT-column storage.
pub fn hash_password(password: &str) -> (String, String) {
    let salt = generate_salt();
    let hash = derive_hash(password, &salt);
    (encode(&hash), encode(&salt))
}

/// Constant-time check of a password against a stored (hash, salt) pair.
/// Undecodable stored material fails closed.
pub fn verify_password(password: &str, stored_hash: &str, stored_salt: &str) -> bool {
    let Some(salt) = decode(stored_salt) else {
        return false;
    };
    let Some(expected) = decode(stored_hash) else {
        return false;
    };
    let candidate = derive_hash(password, &salt);
    candidate.ct_eq(&expected).into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    encode(&hasher.finalize())
}

fn derive_hash(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn decode(s: &str) -> Option<Vec<u8>> {
    base64::engine::general_purpose::STANDARD.decode(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let (hash, salt) = hash_password("hunter2");
        assert!(verify_password("hunter2", &hash, &salt));
    }

    #[test]
    fn wrong_password_rejected() {
        let (hash, salt) = hash_password("hunter2");
        assert!(!verify_password("hunter3", &hash, &salt));
    }

    #[test]
    fn same_password_different_salts() {
        let (hash1, salt1) = hash_password("hunter2");
        let (hash2, salt2) = hash_password("hunter2");
        assert_ne!(salt1, salt2);
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn garbled_stored_material_fails_closed() {
        assert!(!verify_password("hunter2", "not base64 !!!", "also not"));
    }

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
        assert!(!t1.is_empty());
    }

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("test"), hash_token("test"));
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }
}

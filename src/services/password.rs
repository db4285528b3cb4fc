//! Argon2id password hashing.
//!
//! Both functions are CPU-heavy; callers on the async runtime wrap them in
//! `tokio::task::spawn_blocking`.

use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Constant-time verification against a stored digest. A malformed digest
/// verifies as `false` rather than erroring.
#[must_use]
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let digest = hash_password("pw123").unwrap();
        assert!(verify_password("pw123", &digest));
        assert!(!verify_password("pw124", &digest));
    }

    #[test]
    fn digest_is_salted() {
        let a = hash_password("pw123").unwrap();
        let b = hash_password("pw123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_never_verifies() {
        assert!(!verify_password("pw123", "not-a-phc-string"));
    }
}

//! Signed, time-bounded session tokens (HS256 JWT).
//!
//! The token carries only the subject username and an expiry. There is no
//! revocation list; expiry is the sole invalidation mechanism.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Issues a token asserting `username`, expiring after the configured TTL.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.ttl_hours);
        self.issue_with_timestamps(username, now.timestamp(), exp.timestamp())
    }

    fn issue_with_timestamps(
        &self,
        username: &str,
        iat: i64,
        exp: i64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: username.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature and expiry, returning the subject username.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| TokenError::Invalid)?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_returns_subject() {
        let tokens = TokenService::new("test-secret", 24);
        let token = tokens.issue("alice").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("test-secret", 24);
        let now = chrono::Utc::now().timestamp();
        let token = tokens
            .issue_with_timestamps("alice", now - 7200, now - 3600)
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = TokenService::new("test-secret", 24);
        let other = TokenService::new("other-secret", 24);
        let token = other.issue("alice").unwrap();
        assert!(tokens.verify(&token).is_err());
        assert!(tokens.verify("not.a.jwt").is_err());
    }
}

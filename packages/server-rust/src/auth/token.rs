//! Signed bearer-token issuance and verification.
//!
//! The signing key and time-to-live are read once at construction and
//! immutable thereafter. Token payloads carry the subject email and an
//! absolute expiry equal to issuance time plus the configured TTL.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use catalog_core::StoreError;

use crate::config::AuthConfig;

/// Bearer-token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email.
    pub sub: String,
    /// Absolute expiry, seconds since the Unix epoch.
    pub exp: u64,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    /// Builds an issuer from raw key material and a TTL in seconds.
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Builds an issuer from the startup configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_secret.as_bytes(), config.token_ttl_secs)
    }

    /// The configured time-to-live in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issues a token for `subject` expiring TTL seconds from now.
    ///
    /// # Errors
    ///
    /// [`StoreError::Internal`] if the system clock is unusable or
    /// encoding fails.
    pub fn issue(&self, subject: &str) -> Result<String, StoreError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Internal(e.into()))?
            .as_secs();
        let claims = Claims {
            sub: subject.to_string(),
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| StoreError::Internal(e.into()))
    }

    /// Verifies signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unauthorized`] for any invalid, tampered, or
    /// expired token; no further detail is leaked.
    pub fn verify(&self, token: &str) -> Result<Claims, StoreError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| StoreError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-signing-key", 3600)
    }

    fn unix_now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn issued_token_decodes_to_subject_and_expiry() {
        let issuer = issuer();
        let before = unix_now();
        let token = issuer.issue("u@test.com").unwrap();
        let after = unix_now();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "u@test.com");
        // Expiry is issue time + 3600, within one second of the call.
        assert!(claims.exp >= before + 3600);
        assert!(claims.exp <= after + 3600);
    }

    #[test]
    fn tampered_token_is_unauthorized() {
        let issuer = issuer();
        let mut token = issuer.issue("u@test.com").unwrap();
        token.push('x');
        let err = issuer.verify(&token).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn token_from_another_key_is_unauthorized() {
        let token = TokenIssuer::new(b"other-key", 3600)
            .issue("u@test.com")
            .unwrap();
        let err = issuer().verify(&token).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn from_config_carries_the_ttl() {
        let issuer = TokenIssuer::from_config(&AuthConfig {
            token_secret: "k".to_string(),
            token_ttl_secs: 120,
        });
        assert_eq!(issuer.ttl_secs(), 120);
    }
}

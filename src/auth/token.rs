//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret. They carry only the
//! subject id and their issue/expiry timestamps; nothing is stored server side.
//! Expiry is checked against an injectable [`Clock`] instead of inside
//! `jsonwebtoken`, so tests can pin time past the expiry boundary.

use super::AuthError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 10 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject user id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_unix(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Clock pinned to a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("encoding", &"***")
            .field("decoding", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("clock", &self.clock)
            .finish()
    }
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for `subject` valid for the configured TTL.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        let iat = self.clock.now_unix();
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Validate signature and expiry and return the claims.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] for a bad signature or malformed token,
    /// [`AuthError::ExpiredToken`] once `exp` is not in the future.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| {
                debug!("token rejected: {err}");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.exp <= self.clock.now_unix() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    /// Verify `token` and return the subject user id.
    ///
    /// # Errors
    /// Same as [`TokenKeys::decode`], plus [`AuthError::InvalidToken`] when the
    /// subject is not a user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const NOW: i64 = 1_700_000_000;

    fn keys(secret: &str, now: i64) -> TokenKeys {
        TokenKeys::new(&SecretString::from(secret), DEFAULT_TOKEN_TTL_SECONDS)
            .with_clock(Arc::new(FixedClock(now)))
    }

    #[test]
    fn issued_token_verifies_to_subject() -> Result<()> {
        let keys = keys("secret", NOW);
        let subject = Uuid::now_v7();
        let token = keys.issue(subject)?;

        assert_eq!(keys.verify(&token)?, subject);
        Ok(())
    }

    #[test]
    fn claims_carry_ten_minute_window() -> Result<()> {
        let keys = keys("secret", NOW);
        let token = keys.issue(Uuid::now_v7())?;
        let claims = keys.decode(&token)?;

        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 600);
        Ok(())
    }

    #[test]
    fn token_expires_after_ttl() -> Result<()> {
        let subject = Uuid::now_v7();
        let token = keys("secret", NOW).issue(subject)?;

        // One second before expiry still works
        assert_eq!(keys("secret", NOW + 599).verify(&token)?, subject);

        let at_expiry = keys("secret", NOW + 600).verify(&token);
        assert!(matches!(at_expiry, Err(AuthError::ExpiredToken)));

        let later = keys("secret", NOW + 3600).verify(&token);
        assert!(matches!(later, Err(AuthError::ExpiredToken)));
        Ok(())
    }

    #[test]
    fn token_from_other_secret_is_invalid() -> Result<()> {
        let token = keys("secret", NOW).issue(Uuid::now_v7())?;
        let result = keys("rotated", NOW).verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
        Ok(())
    }

    #[test]
    fn malformed_token_is_invalid() {
        let keys = keys("secret", NOW);
        for token in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(keys.verify(token), Err(AuthError::InvalidToken)));
        }
    }

    #[test]
    fn tampered_payload_is_invalid() -> Result<()> {
        let keys = keys("secret", NOW);
        let token = keys.issue(Uuid::now_v7())?;
        let other = keys.issue(Uuid::now_v7())?;

        // Header and signature from one token, payload from another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(keys.verify(&forged), Err(AuthError::InvalidToken)));
        Ok(())
    }

    #[test]
    fn non_uuid_subject_is_invalid() -> Result<()> {
        let claims = Claims {
            sub: "60535c8a0f1f7e244eee6f79".to_string(),
            iat: NOW,
            exp: NOW + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )?;

        let keys = keys("secret", NOW);
        assert_eq!(keys.decode(&token)?, claims);
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
        Ok(())
    }

    #[test]
    fn debug_redacts_keys() {
        let rendered = format!("{:?}", keys("super-secret", NOW));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("ttl_seconds: 600"));
    }
}

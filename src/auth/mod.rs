//! Authentication core: password hashing, bearer tokens, and the account gate.

mod error;
pub mod gate;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthFailure};
pub use gate::{authorize, Subject};
pub use password::{PasswordError, PasswordHasher, BCRYPT_COST, MAX_PASSWORD_LENGTH};
pub use token::{Claims, Clock, FixedClock, SystemClock, TokenKeys, DEFAULT_TOKEN_TTL_SECONDS};

use secrecy::SecretString;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            bcrypt_cost: BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub const fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub const fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

/// Immutable auth state shared by every request.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    hasher: PasswordHasher,
    tokens: TokenKeys,
}

impl AuthState {
    /// The signing secret is only read here; handlers never see it.
    #[must_use]
    pub fn new(config: AuthConfig, jwt_secret: &SecretString) -> Self {
        Self {
            hasher: PasswordHasher::new(config.bcrypt_cost()),
            tokens: TokenKeys::new(jwt_secret, config.token_ttl_seconds()),
            config,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tokens = self.tokens.with_clock(clock);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub const fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl_seconds(), 600);
        assert_eq!(config.bcrypt_cost(), 10);
    }

    #[test]
    fn state_follows_config() {
        let config = AuthConfig::new()
            .with_token_ttl_seconds(60)
            .with_bcrypt_cost(4);
        let state = AuthState::new(config, &SecretString::from("secret"));
        assert_eq!(state.tokens().ttl_seconds(), 60);
        assert_eq!(state.hasher().cost(), 4);
        assert_eq!(state.config().token_ttl_seconds(), 60);
    }
}

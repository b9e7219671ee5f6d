//! Salted one-way password hashing (bcrypt).
//!
//! bcrypt is deliberately slow, so both operations run on the blocking thread pool
//! instead of stalling the async workers.
//!
//! bcrypt only reads the first 72 bytes of its input and stops at a NUL byte, so
//! longer passwords or passwords containing NUL are refused outright; otherwise two
//! different passwords could share a hash.

use thiserror::Error;

/// Work factor applied to every new hash.
pub const BCRYPT_COST: u32 = 10;

/// Longest password bcrypt reads in full, in bytes.
pub const MAX_PASSWORD_LENGTH: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("password must be at most {MAX_PASSWORD_LENGTH} bytes and contain no NUL")]
    Unsupported,
    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(BCRYPT_COST)
    }
}

impl PasswordHasher {
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Check that bcrypt would read all of `plaintext`.
    ///
    /// # Errors
    /// [`PasswordError::Unsupported`] if it is longer than [`MAX_PASSWORD_LENGTH`]
    /// bytes or contains a NUL byte.
    pub fn validate(plaintext: &str) -> Result<(), PasswordError> {
        if plaintext.len() > MAX_PASSWORD_LENGTH || plaintext.contains('\0') {
            return Err(PasswordError::Unsupported);
        }
        Ok(())
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if the password is unsupported, bcrypt rejects the input or
    /// the blocking task fails.
    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Self::validate(plaintext)?;
        let plaintext = plaintext.to_string();
        let cost = self.cost;

        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
        Ok(hashed)
    }

    /// Check `plaintext` against a stored hash. An unsupported password never matches.
    ///
    /// # Errors
    /// Returns an error if `hash` is not a bcrypt hash or the blocking task fails.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        if Self::validate(plaintext).is_err() {
            return Ok(false);
        }

        let plaintext = plaintext.to_string();
        let hash = hash.to_string();

        let matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await??;
        Ok(matches)
    }
}

//! bcrypt-backed `PasswordHasher`.
//!
//! bcrypt is deliberately slow, so both hashing and verification run on the
//! blocking thread pool.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Salted bcrypt hashing with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Build a hasher with the given work factor (4..=31).
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured work factor.
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

fn map_join_error(error: tokio::task::JoinError) -> PasswordHasherError {
    PasswordHasherError::task(error.to_string())
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let password = password.to_owned();
        let cost = self.cost;
        let encoded = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(map_join_error)?
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.to_owned();
        let encoded = hash.as_str().to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &encoded))
            .await
            .map_err(map_join_error)?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(err) => {
                debug!(error = %err, "stored password hash could not be parsed");
                Err(PasswordHasherError::hash(err.to_string()))
            }
        }
    }
}

//! Driving port for the bearer-token gate in front of protected operations.

use crate::domain::{Error, Identity};

/// Resolves a bearer token into the caller's identity.
#[cfg_attr(test, mockall::automock)]
pub trait SessionVerifier: Send + Sync {
    /// Fail with `unauthorized` when the token is malformed, forged or
    /// expired.
    fn authenticate(&self, token: &str) -> Result<Identity, Error>;
}

//! Port for signing and verifying session tokens.
//!
//! Time is passed in explicitly so expiry is decided by the caller's clock,
//! never by the codec reading the wall clock itself.

use chrono::{DateTime, Utc};

use crate::domain::{Identity, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session token codecs.
    pub enum SessionTokenError {
        /// The token could not be signed.
        Encode { message: String } => "session token could not be issued: {message}",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "session token is invalid: {message}",
        /// The token verified but its expiry has passed.
        Expired => "session token has expired",
    }
}

/// Signed, self-contained session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokenCodec: Send + Sync {
    /// Sign a token for `identity`, valid from `issued_at` for the codec's
    /// configured lifetime.
    fn issue(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<SessionToken, SessionTokenError>;

    /// Verify a token's signature and expiry as of `now`.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, SessionTokenError>;
}

//! Driving port for registration and login.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! create accounts and exchange credentials for a session token without
//! knowing (or importing) the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{Error, IssuedSession, LoginCredentials, Role};

/// Domain use-case port for account creation and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Create an account and return the role it was assigned.
    ///
    /// The first account ever created becomes an admin.
    async fn register(&self, credentials: &LoginCredentials) -> Result<Role, Error>;

    /// Validate credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords fail with the same
    /// `unauthorized` error.
    async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedSession, Error>;
}

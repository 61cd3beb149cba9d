//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{PasswordHash, Role, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } => "username already exists: {username}",
    }
}

/// Account to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: Username,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
    /// Initial role.
    pub role: Role,
}

/// Stored account including its credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public account data.
    pub user: User,
    /// Encoded password hash.
    pub password_hash: PasswordHash,
}

/// Credential store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Number of accounts.
    async fn count(&self) -> Result<u64, UserPersistenceError>;

    /// Create an account.
    ///
    /// Fails with [`UserPersistenceError::DuplicateUsername`] when the name is
    /// taken.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch an account and its hash by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// All accounts ordered by id.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Remove an account; `false` when no row matched.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Change an account's role; `false` when no row matched.
    async fn update_role(&self, id: UserId, role: Role) -> Result<bool, UserPersistenceError>;
}

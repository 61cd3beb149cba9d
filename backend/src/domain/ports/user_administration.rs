//! Driving port for admin-only account management.

use async_trait::async_trait;

use crate::domain::{Error, Identity, Role, User, UserId};

/// Account management. Every operation requires an admin caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// All accounts.
    async fn list_users(&self, caller: &Identity) -> Result<Vec<User>, Error>;

    /// Delete an account. Records it submitted keep its username.
    async fn delete_user(&self, caller: &Identity, id: UserId) -> Result<(), Error>;

    /// Change an account's role.
    async fn update_role(&self, caller: &Identity, id: UserId, role: Role) -> Result<(), Error>;
}

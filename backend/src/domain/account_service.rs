//! Account domain service: registration, login, the session gate and admin
//! account management.
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, NewUser, PasswordHasher, PasswordHasherError, SessionTokenCodec,
    SessionTokenError, SessionVerifier, UserAdministration, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, Identity, IssuedSession, LoginCredentials, Role, User, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AccountService<U, H, T> {
    /// Create a new service over the credential store, hasher and token codec.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => Error::conflict("username already exists"),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: SessionTokenError) -> Error {
    match error {
        SessionTokenError::Encode { message } => {
            Error::internal(format!("failed to issue session token: {message}"))
        }
        SessionTokenError::Invalid { .. } => Error::unauthorized("invalid session token"),
        SessionTokenError::Expired => Error::unauthorized("session token has expired"),
    }
}

#[async_trait]
impl<U, H, T> LoginService for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: SessionTokenCodec,
{
    async fn register(&self, credentials: &LoginCredentials) -> Result<Role, Error> {
        // Count-then-insert is not serialised; two concurrent first
        // registrations may both become admin.
        let existing = self.users.count().await.map_err(map_user_error)?;
        let role = if existing == 0 { Role::Admin } else { Role::User };

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        let user = self
            .users
            .insert(&NewUser {
                username: credentials.username().clone(),
                password_hash,
                role,
            })
            .await
            .map_err(map_user_error)?;

        info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user.role)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedSession, Error> {
        let Some(account) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let User { id, username, role } = account.user;
        let identity = Identity {
            id,
            username: username.clone(),
            role,
        };
        let token = self
            .tokens
            .issue(&identity, self.clock.utc())
            .map_err(map_token_error)?;
        Ok(IssuedSession {
            token,
            username,
            role,
        })
    }
}

impl<U, H, T> SessionVerifier for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: SessionTokenCodec,
{
    fn authenticate(&self, token: &str) -> Result<Identity, Error> {
        self.tokens
            .verify(token, self.clock.utc())
            .map_err(map_token_error)
    }
}

#[async_trait]
impl<U, H, T> UserAdministration for AccountService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: SessionTokenCodec,
{
    async fn list_users(&self, caller: &Identity) -> Result<Vec<User>, Error> {
        caller.require_role(Role::Admin)?;
        self.users.list().await.map_err(map_user_error)
    }

    async fn delete_user(&self, caller: &Identity, id: UserId) -> Result<(), Error> {
        caller.require_role(Role::Admin)?;
        if self.users.delete(id).await.map_err(map_user_error)? {
            info!(user_id = %id, by = %caller.username, "deleted user");
            Ok(())
        } else {
            Err(Error::not_found(format!("user {id} not found")))
        }
    }

    async fn update_role(&self, caller: &Identity, id: UserId, role: Role) -> Result<(), Error> {
        caller.require_role(Role::Admin)?;
        if self
            .users
            .update_role(id, role)
            .await
            .map_err(map_user_error)?
        {
            if id == caller.id && role != Role::Admin {
                warn!(user_id = %id, "admin demoted their own account");
            }
            info!(user_id = %id, %role, by = %caller.username, "updated user role");
            Ok(())
        } else {
            Err(Error::not_found(format!("user {id} not found")))
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;

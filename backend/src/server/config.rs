//! Server settings loaded via OrthoConfig and the resolved server
//! configuration handed to [`super::create_server`].

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use courier_backend::inbound::http::state::DEFAULT_UPLOAD_LIMIT_BYTES;
use courier_backend::outbound::persistence::DbPool;
use courier_backend::outbound::security::{DEFAULT_BCRYPT_COST, SigningKey};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_PATH: &str = "logistics.db";

/// Values controlling the listener, storage and credential handling.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// HS256 secret for session tokens.
    pub jwt_secret: Option<String>,
    /// bcrypt work factor for new password hashes.
    #[ortho_config(default = 10)]
    pub bcrypt_cost: u32,
    /// Largest accepted upload, in bytes.
    pub upload_limit_bytes: Option<usize>,
    /// Maximum pooled SQLite connections.
    #[ortho_config(default = 8)]
    pub pool_max_size: u32,
}

impl ServerSettings {
    /// Configured listen address, falling back to `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Configured database path, falling back to `logistics.db`.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    /// Non-empty configured JWT secret.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|secret| !secret.is_empty())
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.upload_limit_bytes.unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES)
    }
}

/// Everything the HTTP server needs once settings and secrets are resolved.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) signing_key: SigningKey,
    pub(crate) bcrypt_cost: u32,
    pub(crate) upload_limit_bytes: usize,
}

impl ServerConfig {
    /// Construct a configuration with the default cost and upload limit.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, signing_key: SigningKey) -> Self {
        Self {
            bind_addr,
            db_pool,
            signing_key,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
        }
    }

    /// Override the bcrypt work factor.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Override the upload size limit.
    #[must_use]
    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "COURIER_BIND_ADDR",
        "COURIER_DATABASE_PATH",
        "COURIER_JWT_SECRET",
        "COURIER_BCRYPT_COST",
        "COURIER_UPLOAD_LIMIT_BYTES",
        "COURIER_POOL_MAX_SIZE",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("courier-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000".parse().expect("addr"));
        assert_eq!(settings.database_path(), PathBuf::from("logistics.db"));
        assert!(settings.jwt_secret().is_none());
        assert_eq!(settings.bcrypt_cost, 10);
        assert_eq!(settings.upload_limit_bytes(), 10 * 1024 * 1024);
        assert_eq!(settings.pool_max_size, 8);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("COURIER_BIND_ADDR", Some("127.0.0.1:8080".to_owned())),
            ("COURIER_DATABASE_PATH", Some("/tmp/courier.db".to_owned())),
            ("COURIER_JWT_SECRET", Some("rahasia-rahasia".to_owned())),
            ("COURIER_BCRYPT_COST", Some("4".to_owned())),
            ("COURIER_UPLOAD_LIMIT_BYTES", Some("2048".to_owned())),
            ("COURIER_POOL_MAX_SIZE", Some("2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080".parse().expect("addr"));
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/courier.db"));
        assert_eq!(settings.jwt_secret(), Some("rahasia-rahasia"));
        assert_eq!(settings.bcrypt_cost, 4);
        assert_eq!(settings.upload_limit_bytes(), 2048);
        assert_eq!(settings.pool_max_size, 2);
    }

    #[rstest]
    fn blank_secret_counts_as_unset() {
        let mut guard_vars = VARS.map(|name| (name, None::<String>));
        guard_vars[2].1 = Some(String::new());
        let _guard = lock_env(guard_vars);

        assert!(load_from_empty_args().jwt_secret().is_none());
    }
}

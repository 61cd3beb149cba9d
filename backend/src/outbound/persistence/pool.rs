//! Async-safe connection pool for Diesel SQLite connections.
//!
//! SQLite has no async driver, so each connection is a synchronous
//! `SqliteConnection` wrapped in `diesel-async`'s `SyncConnectionWrapper`,
//! which runs queries on the blocking pool. `bb8` manages checkout.
//!
//! # Design
//!
//! - Every new connection applies the same pragmas: WAL journaling, a busy
//!   timeout so concurrent writers wait instead of failing, and foreign keys.
//! - Every new connection registers [`fold_case`], since SQLite's own
//!   `lower()` and `LIKE` only fold ASCII.
//! - Pool checkout respects the configured timeout.
//! - All errors are mapped to `PoolError` variants.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::sql_types::{Nullable, Text};
use diesel::{Connection, ConnectionError, ConnectionResult, SqliteConnection};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use futures_util::FutureExt as _;
use futures_util::future::BoxFuture;

/// Async SQLite connection type used by every repository.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
     PRAGMA busy_timeout = 5000; \
     PRAGMA foreign_keys = ON;";

diesel::define_sql_function! {
    /// Unicode lowercase of a text value; `NULL` stays `NULL`.
    fn fold_case(value: Nullable<Text>) -> Nullable<Text>;
}

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the database connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use courier_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("logistics.db")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "logistics.db");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration for the given database file path.
    ///
    /// Uses defaults of 8 connections, 1 idle, and a 30 second checkout
    /// timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 8,
            min_idle: Some(1),
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database file path.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

fn establish_blocking(url: &str) -> ConnectionResult<SqliteConnection> {
    let mut conn = SqliteConnection::establish(url)?;
    conn.batch_execute(CONNECTION_PRAGMAS)
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
    fold_case_utils::register_impl(&mut conn, |value: Option<String>| {
        value.map(|text| text.to_lowercase())
    })
    .map_err(ConnectionError::CouldntSetupConfiguration)?;
    Ok(conn)
}

fn establish_with_pragmas(url: &str) -> BoxFuture<'_, ConnectionResult<SqliteConn>> {
    let url = url.to_owned();
    async move {
        let conn = tokio::task::spawn_blocking(move || establish_blocking(&url))
            .await
            .map_err(|err| ConnectionError::BadConnection(err.to_string()))??;
        Ok(SyncConnectionWrapper::new(conn))
    }
    .boxed()
}

/// Async connection pool for SQLite via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<SqliteConn>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be constructed, e.g. the
    /// database file cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(establish_with_pragmas);
        let manager = AsyncDieselConnectionManager::<SqliteConn>::new_with_config(
            &config.database_url,
            manager_config,
        );

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, SqliteConn>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::{QueryableByName, sql_query};
    use diesel_async::RunQueryDsl;
    use rstest::rstest;

    #[rstest]
    fn pool_config_default_values() {
        let config = PoolConfig::new("logistics.db");

        assert_eq!(config.database_url(), "logistics.db");
        assert_eq!(config.max_size, 8);
        assert_eq!(config.min_idle, Some(1));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }

    #[rstest]
    fn pool_config_builder_pattern() {
        let config = PoolConfig::new("logistics.db")
            .with_max_size(2)
            .with_min_idle(None)
            .with_connection_timeout(Duration::from_secs(5));

        assert_eq!(config.max_size, 2);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn pool_error_display() {
        let checkout_err = PoolError::checkout("timed out");
        let build_err = PoolError::build("unable to open database file");

        assert!(checkout_err.to_string().contains("timed out"));
        assert!(build_err.to_string().contains("unable to open database file"));
    }

    #[derive(QueryableByName)]
    struct JournalMode {
        #[diesel(sql_type = Text)]
        journal_mode: String,
    }

    #[tokio::test]
    async fn connections_use_wal_journal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pool.db");
        let pool = DbPool::new(PoolConfig::new(path.to_string_lossy()).with_max_size(1))
            .await
            .expect("pool builds");

        let mut conn = pool.get().await.expect("checkout");
        let mode: JournalMode = sql_query("PRAGMA journal_mode")
            .get_result(&mut conn)
            .await
            .expect("pragma query");
        assert_eq!(mode.journal_mode.to_lowercase(), "wal");
    }

    #[derive(QueryableByName)]
    struct Folded {
        #[diesel(sql_type = Nullable<Text>)]
        folded: Option<String>,
    }

    #[tokio::test]
    async fn connections_fold_non_ascii_case() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pool.db");
        let pool = DbPool::new(PoolConfig::new(path.to_string_lossy()).with_max_size(1))
            .await
            .expect("pool builds");

        let mut conn = pool.get().await.expect("checkout");
        let row: Folded = sql_query("SELECT fold_case('ÉLODIE Çakir') AS folded")
            .get_result(&mut conn)
            .await
            .expect("fold_case is registered");
        assert_eq!(row.folded.as_deref(), Some("élodie çakir"));
    }
}

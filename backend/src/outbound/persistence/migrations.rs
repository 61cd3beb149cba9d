//! Embedded schema migrations, applied at startup.

use diesel::{Connection, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use super::pool::PoolError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration to the database at `database_url`.
///
/// Runs on the blocking pool because migrations need a synchronous
/// connection. Creates the database file when it does not exist yet.
///
/// # Errors
///
/// Returns `PoolError::Build` when the database cannot be opened or a
/// migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || -> Result<usize, PoolError> {
        let mut conn = SqliteConnection::establish(&url)
            .map_err(|err| PoolError::build(format!("open database: {err}")))?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| PoolError::build(format!("migration: {err}")))?;
        Ok(versions.len())
    })
    .await
    .map_err(|err| PoolError::build(format!("migration task failed: {err}")))??;

    info!(applied, "database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("migrate.db");
        let url = path.to_string_lossy();

        run_migrations(&url).await.expect("first run");
        run_migrations(&url).await.expect("second run is a no-op");
    }

    #[tokio::test]
    async fn unreachable_paths_fail_to_build() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("nested.db");

        let err = run_migrations(&path.to_string_lossy())
            .await
            .expect_err("parent directory does not exist");
        assert!(matches!(err, PoolError::Build { .. }));
    }
}

//! SQLite-backed `ManualStatsRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ManualStatsPersistenceError, ManualStatsRepository};
use crate::domain::{ManualStats, StoredManualStats};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ManualStatsRow, NewManualStatsRow};
use super::pool::{DbPool, PoolError};
use super::schema::manual_stats;

/// Diesel-backed implementation of the `ManualStatsRepository` port.
///
/// Rows are unique per date; writing a date that already exists replaces its
/// counters and submitter but keeps the original id and creation time.
#[derive(Clone)]
pub struct DieselManualStatsRepository {
    pool: DbPool,
}

impl DieselManualStatsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ManualStatsPersistenceError {
    map_basic_pool_error(error, ManualStatsPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ManualStatsPersistenceError {
    map_basic_diesel_error(
        error,
        ManualStatsPersistenceError::query,
        ManualStatsPersistenceError::connection,
    )
}

fn to_domain(row: ManualStatsRow) -> Result<StoredManualStats, ManualStatsPersistenceError> {
    StoredManualStats::try_from(row)
        .map_err(|err| ManualStatsPersistenceError::query(err.to_string()))
}

#[async_trait]
impl ManualStatsRepository for DieselManualStatsRepository {
    async fn upsert(
        &self,
        stats: &ManualStats,
    ) -> Result<StoredManualStats, ManualStatsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewManualStatsRow::from(stats);

        let stored: ManualStatsRow = diesel::insert_into(manual_stats::table)
            .values(&row)
            .on_conflict(manual_stats::date)
            .do_update()
            .set((
                manual_stats::delivery_success.eq(excluded(manual_stats::delivery_success)),
                manual_stats::delivery_pending.eq(excluded(manual_stats::delivery_pending)),
                manual_stats::pickup_success.eq(excluded(manual_stats::pickup_success)),
                manual_stats::pickup_failed.eq(excluded(manual_stats::pickup_failed)),
                manual_stats::cod_packages_count.eq(excluded(manual_stats::cod_packages_count)),
                manual_stats::submitted_by.eq(excluded(manual_stats::submitted_by)),
            ))
            .returning(ManualStatsRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        to_domain(stored)
    }

    async fn list(&self) -> Result<Vec<StoredManualStats>, ManualStatsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ManualStatsRow> = manual_stats::table
            .order(manual_stats::date.desc())
            .select(ManualStatsRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(to_domain).collect()
    }
}

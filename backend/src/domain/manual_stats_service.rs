//! Manual stats domain service.
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    ManualStatsCommand, ManualStatsPersistenceError, ManualStatsQuery, ManualStatsRepository,
};
use crate::domain::{Error, ManualStats, StoredManualStats};

/// Service implementing the manual stats driving ports.
#[derive(Clone)]
pub struct ManualStatsService<R> {
    repo: Arc<R>,
}

impl<R> ManualStatsService<R> {
    /// Create a new service over the manual stats store.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn map_stats_error(error: ManualStatsPersistenceError) -> Error {
    match error {
        ManualStatsPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("manual stats repository unavailable: {message}"))
        }
        ManualStatsPersistenceError::Query { message } => {
            Error::internal(format!("manual stats repository error: {message}"))
        }
    }
}

#[async_trait]
impl<R> ManualStatsCommand for ManualStatsService<R>
where
    R: ManualStatsRepository,
{
    async fn record(&self, stats: ManualStats) -> Result<StoredManualStats, Error> {
        let stored = self.repo.upsert(&stats).await.map_err(map_stats_error)?;
        info!(date = %stored.stats.date, by = %stored.stats.submitted_by, "recorded manual stats");
        Ok(stored)
    }
}

#[async_trait]
impl<R> ManualStatsQuery for ManualStatsService<R>
where
    R: ManualStatsRepository,
{
    async fn list(&self) -> Result<Vec<StoredManualStats>, Error> {
        self.repo.list().await.map_err(map_stats_error)
    }
}

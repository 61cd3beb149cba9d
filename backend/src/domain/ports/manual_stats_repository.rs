//! Port for manual daily statistics persistence.

use async_trait::async_trait;

use crate::domain::{ManualStats, StoredManualStats};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by manual stats repository adapters.
    pub enum ManualStatsPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "manual stats repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "manual stats repository query failed: {message}",
    }
}

/// Store of per-date counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManualStatsRepository: Send + Sync {
    /// Insert the date's counters or replace every counter of an existing
    /// row for that date.
    async fn upsert(
        &self,
        stats: &ManualStats,
    ) -> Result<StoredManualStats, ManualStatsPersistenceError>;

    /// All rows, newest date first.
    async fn list(&self) -> Result<Vec<StoredManualStats>, ManualStatsPersistenceError>;
}

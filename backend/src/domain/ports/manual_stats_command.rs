//! Driving ports for manual daily statistics.

use async_trait::async_trait;

use crate::domain::{Error, ManualStats, StoredManualStats};

/// Records counters for a date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManualStatsCommand: Send + Sync {
    /// Insert or fully replace the counters for `stats.date`.
    async fn record(&self, stats: ManualStats) -> Result<StoredManualStats, Error>;
}

/// Reads recorded counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManualStatsQuery: Send + Sync {
    /// Every row, newest date first.
    async fn list(&self) -> Result<Vec<StoredManualStats>, Error>;
}

//! Driving port for reading shipment records.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{DeliveryRecord, Error, PickupRecord, RecapRow, RecordFilter, ShipmentDump};

/// Filtered listings, the full dump and the per-user recap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipmentQuery: Send + Sync {
    /// One page of pickups matching `filter`.
    async fn list_pickups(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<PickupRecord>, Error>;

    /// One page of deliveries matching `filter`.
    async fn list_deliveries(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, Error>;

    /// Every record of both kinds.
    async fn dump(&self) -> Result<ShipmentDump, Error>;

    /// Per-user aggregates ordered by username.
    async fn recap(&self) -> Result<Vec<RecapRow>, Error>;
}

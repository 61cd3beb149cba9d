//! Port for pickup and delivery persistence.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Awb, DeliveryRecord, DeliveryTally, PickupRecord, PickupTally, PurgeCounts, RecordFilter,
    RecordKind, UpsertBatch,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by shipment repository adapters.
    pub enum ShipmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "shipment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "shipment repository query failed: {message}",
        /// An insert collided with an existing AWB.
        Duplicate { awb: String } => "AWB already exists: {awb}",
    }
}

/// One page of rows plus the filtered row count.
pub type RecordSlice<T> = (Vec<T>, u64);

/// Record store for both shipment kinds.
///
/// Listings order rows by event date, newest first, then by AWB so pages are
/// stable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Upsert every staged record inside one transaction.
    ///
    /// Either every row is written or none is.
    async fn upsert_batch(&self, batch: &UpsertBatch) -> Result<(), ShipmentPersistenceError>;

    /// Insert a new pickup; [`ShipmentPersistenceError::Duplicate`] when the
    /// AWB exists.
    async fn insert_pickup(&self, record: &PickupRecord) -> Result<(), ShipmentPersistenceError>;

    /// Insert a new delivery; [`ShipmentPersistenceError::Duplicate`] when
    /// the AWB exists.
    async fn insert_delivery(
        &self,
        record: &DeliveryRecord,
    ) -> Result<(), ShipmentPersistenceError>;

    /// Overwrite every field of an existing pickup; `false` when absent.
    async fn update_pickup(&self, record: &PickupRecord)
    -> Result<bool, ShipmentPersistenceError>;

    /// Overwrite every field of an existing delivery; `false` when absent.
    async fn update_delivery(
        &self,
        record: &DeliveryRecord,
    ) -> Result<bool, ShipmentPersistenceError>;

    /// Delete one row of the given kind; `false` when absent.
    async fn delete(&self, kind: RecordKind, awb: &Awb) -> Result<bool, ShipmentPersistenceError>;

    /// Delete the AWB from both kinds in one transaction.
    async fn purge(&self, awb: &Awb) -> Result<PurgeCounts, ShipmentPersistenceError>;

    /// Filtered page of pickups.
    async fn list_pickups(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordSlice<PickupRecord>, ShipmentPersistenceError>;

    /// Filtered page of deliveries.
    async fn list_deliveries(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordSlice<DeliveryRecord>, ShipmentPersistenceError>;

    /// Every pickup.
    async fn all_pickups(&self) -> Result<Vec<PickupRecord>, ShipmentPersistenceError>;

    /// Every delivery.
    async fn all_deliveries(&self) -> Result<Vec<DeliveryRecord>, ShipmentPersistenceError>;

    /// Pickup counts grouped by submitter.
    async fn pickup_tallies(&self) -> Result<Vec<PickupTally>, ShipmentPersistenceError>;

    /// Delivery counts and COD sums grouped by submitter and status.
    async fn delivery_tallies(&self) -> Result<Vec<DeliveryTally>, ShipmentPersistenceError>;
}

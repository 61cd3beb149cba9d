//! Driving port for single-record shipment writes.
//!
//! Any authenticated caller may create, edit or delete any record; only the
//! cross-kind purge is restricted to admins. The caller becomes the record's
//! submitter on every write.

use async_trait::async_trait;

use crate::domain::{
    Awb, DeliveryFields, DeliveryRecord, Error, Identity, PickupFields, PickupRecord, PurgeCounts,
    RecordKind,
};

/// Single-record create, overwrite and delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShipmentCommand: Send + Sync {
    /// Create a pickup; `conflict` when the AWB already has one.
    async fn create_pickup(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: PickupFields,
    ) -> Result<PickupRecord, Error>;

    /// Create a delivery; `conflict` when the AWB already has one.
    async fn create_delivery(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: DeliveryFields,
    ) -> Result<DeliveryRecord, Error>;

    /// Overwrite every field of a pickup; `not_found` when absent.
    async fn update_pickup(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: PickupFields,
    ) -> Result<PickupRecord, Error>;

    /// Overwrite every field of a delivery; `not_found` when absent.
    async fn update_delivery(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: DeliveryFields,
    ) -> Result<DeliveryRecord, Error>;

    /// Delete one record of `kind`; `not_found` when absent.
    async fn delete(&self, caller: &Identity, kind: RecordKind, awb: Awb) -> Result<(), Error>;

    /// Admin-only removal of the AWB from both kinds. Succeeds when nothing
    /// matched.
    async fn purge(&self, caller: &Identity, awb: Awb) -> Result<PurgeCounts, Error>;
}

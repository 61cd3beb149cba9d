//! Shipment domain service: listings, recap and single-record writes.
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::{
    ShipmentCommand, ShipmentPersistenceError, ShipmentQuery, ShipmentRepository,
};
use crate::domain::{
    Awb, DeliveryFields, DeliveryRecord, Error, Identity, PickupFields, PickupRecord, PurgeCounts,
    RecapRow, RecordFilter, RecordKind, Role, ShipmentDump, build_recap,
};

/// Service implementing the shipment query and command ports.
#[derive(Clone)]
pub struct ShipmentService<R> {
    repo: Arc<R>,
}

impl<R> ShipmentService<R> {
    /// Create a new service over the record store.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

pub(crate) fn map_shipment_error(error: ShipmentPersistenceError) -> Error {
    match error {
        ShipmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("shipment repository unavailable: {message}"))
        }
        ShipmentPersistenceError::Query { message } => {
            Error::internal(format!("shipment repository error: {message}"))
        }
        ShipmentPersistenceError::Duplicate { awb } => {
            Error::conflict(format!("AWB {awb} already exists"))
        }
    }
}

fn missing(kind: RecordKind, awb: &Awb) -> Error {
    Error::not_found(format!("{kind} {awb} not found"))
}

#[async_trait]
impl<R> ShipmentQuery for ShipmentService<R>
where
    R: ShipmentRepository,
{
    async fn list_pickups(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<PickupRecord>, Error> {
        let (rows, total) = self
            .repo
            .list_pickups(filter, page)
            .await
            .map_err(map_shipment_error)?;
        Ok(Page::new(rows, page, total))
    }

    async fn list_deliveries(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<Page<DeliveryRecord>, Error> {
        let (rows, total) = self
            .repo
            .list_deliveries(filter, page)
            .await
            .map_err(map_shipment_error)?;
        Ok(Page::new(rows, page, total))
    }

    async fn dump(&self) -> Result<ShipmentDump, Error> {
        let pickup_data = self.repo.all_pickups().await.map_err(map_shipment_error)?;
        let delivery_data = self
            .repo
            .all_deliveries()
            .await
            .map_err(map_shipment_error)?;
        Ok(ShipmentDump {
            pickup_data,
            delivery_data,
        })
    }

    async fn recap(&self) -> Result<Vec<RecapRow>, Error> {
        let pickups = self
            .repo
            .pickup_tallies()
            .await
            .map_err(map_shipment_error)?;
        let deliveries = self
            .repo
            .delivery_tallies()
            .await
            .map_err(map_shipment_error)?;
        Ok(build_recap(pickups, deliveries))
    }
}

#[async_trait]
impl<R> ShipmentCommand for ShipmentService<R>
where
    R: ShipmentRepository,
{
    async fn create_pickup(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: PickupFields,
    ) -> Result<PickupRecord, Error> {
        let record = PickupRecord::from_fields(awb, fields, caller.username.clone());
        self.repo
            .insert_pickup(&record)
            .await
            .map_err(map_shipment_error)?;
        Ok(record)
    }

    async fn create_delivery(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: DeliveryFields,
    ) -> Result<DeliveryRecord, Error> {
        let record = DeliveryRecord::from_fields(awb, fields, caller.username.clone());
        self.repo
            .insert_delivery(&record)
            .await
            .map_err(map_shipment_error)?;
        Ok(record)
    }

    async fn update_pickup(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: PickupFields,
    ) -> Result<PickupRecord, Error> {
        let record = PickupRecord::from_fields(awb, fields, caller.username.clone());
        if self
            .repo
            .update_pickup(&record)
            .await
            .map_err(map_shipment_error)?
        {
            Ok(record)
        } else {
            Err(missing(RecordKind::Pickup, &record.awb))
        }
    }

    async fn update_delivery(
        &self,
        caller: &Identity,
        awb: Awb,
        fields: DeliveryFields,
    ) -> Result<DeliveryRecord, Error> {
        let record = DeliveryRecord::from_fields(awb, fields, caller.username.clone());
        if self
            .repo
            .update_delivery(&record)
            .await
            .map_err(map_shipment_error)?
        {
            Ok(record)
        } else {
            Err(missing(RecordKind::Delivery, &record.awb))
        }
    }

    async fn delete(&self, caller: &Identity, kind: RecordKind, awb: Awb) -> Result<(), Error> {
        if self
            .repo
            .delete(kind, &awb)
            .await
            .map_err(map_shipment_error)?
        {
            info!(%kind, %awb, by = %caller.username, "deleted shipment record");
            Ok(())
        } else {
            Err(missing(kind, &awb))
        }
    }

    async fn purge(&self, caller: &Identity, awb: Awb) -> Result<PurgeCounts, Error> {
        caller.require_role(Role::Admin)?;
        let counts = self.repo.purge(&awb).await.map_err(map_shipment_error)?;
        info!(
            %awb,
            pickup_removed = counts.pickup_removed,
            delivery_removed = counts.delivery_removed,
            by = %caller.username,
            "purged shipment"
        );
        Ok(counts)
    }
}

#[cfg(test)]
#[path = "shipment_service_tests.rs"]
mod tests;

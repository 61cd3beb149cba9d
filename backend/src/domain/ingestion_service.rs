//! Workbook ingestion: decode an upload, validate every row of the `Pickup`
//! and `Delivery` sheets, then upsert the lot in one transaction.
//!
//! Validation finishes before anything is written, so a rejected cell or a
//! missing sheet leaves the store untouched.
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::domain::ports::{
    ShipmentRepository, WorkbookIngestion, WorkbookReadError, WorkbookReader,
};
use crate::domain::shipment_service::map_shipment_error;
use crate::domain::{
    DeliveryRecord, Error, Identity, PickupRecord, RowError, Sheet, ShipmentKind, UpsertBatch,
    Username, Workbook,
};

/// Outcome of a successful upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct IngestionSummary {
    /// Distinct pickup AWBs written.
    pub pickup_upserted: u64,
    /// Distinct delivery AWBs written.
    pub delivery_upserted: u64,
    /// Pickup rows skipped for lacking an AWB.
    pub pickup_skipped: u64,
    /// Delivery rows skipped for lacking an AWB.
    pub delivery_skipped: u64,
}

/// Service implementing the [`WorkbookIngestion`] driving port.
#[derive(Clone)]
pub struct IngestionService<R, W> {
    repo: Arc<R>,
    reader: Arc<W>,
}

impl<R, W> IngestionService<R, W> {
    /// Create a new service over the record store and workbook reader.
    pub fn new(repo: Arc<R>, reader: Arc<W>) -> Self {
        Self { repo, reader }
    }
}

fn map_read_error(error: WorkbookReadError) -> Error {
    match error {
        WorkbookReadError::Format { message } => {
            Error::invalid_workbook(format!("uploaded file is not a valid workbook: {message}"))
        }
        WorkbookReadError::Sheet { sheet, message } => Error::invalid_workbook(format!(
            "sheet {sheet} could not be read: {message}"
        ))
        .with_details(json!({ "sheet": sheet })),
    }
}

fn require_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, Error> {
    workbook.sheet(name).ok_or_else(|| {
        Error::invalid_request(format!("missing required sheet: {name}"))
            .with_details(json!({ "sheet": name }))
    })
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Validate every row of `sheet` into `batch`, returning how many rows were
/// skipped for lacking an AWB.
fn stage_sheet<K: ShipmentKind>(
    sheet: &Sheet,
    acting_user: &Username,
    batch: &mut UpsertBatch,
) -> Result<u64, RowError> {
    let mut skipped = 0_u64;
    for row in sheet.records() {
        match K::validate(&row, acting_user)? {
            Some(record) => batch.upsert(record),
            None => {
                debug!(kind = %K::KIND, row = row.number(), "skipping row without AWB");
                skipped = skipped.saturating_add(1);
            }
        }
    }
    Ok(skipped)
}

impl<R, W> IngestionService<R, W>
where
    W: WorkbookReader + 'static,
{
    async fn decode(&self, bytes: Vec<u8>) -> Result<Workbook, Error> {
        let reader = Arc::clone(&self.reader);
        tokio::task::spawn_blocking(move || reader.read(&bytes))
            .await
            .map_err(|err| Error::internal(format!("workbook decoding task failed: {err}")))?
            .map_err(map_read_error)
    }
}

#[async_trait]
impl<R, W> WorkbookIngestion for IngestionService<R, W>
where
    R: ShipmentRepository,
    W: WorkbookReader + 'static,
{
    async fn ingest(&self, caller: &Identity, bytes: Vec<u8>) -> Result<IngestionSummary, Error> {
        let workbook = self.decode(bytes).await?;
        let pickups = require_sheet(&workbook, PickupRecord::KIND.sheet_name())?;
        let deliveries = require_sheet(&workbook, DeliveryRecord::KIND.sheet_name())?;

        let mut batch = UpsertBatch::new();
        let pickup_skipped = stage_sheet::<PickupRecord>(pickups, &caller.username, &mut batch)?;
        let delivery_skipped =
            stage_sheet::<DeliveryRecord>(deliveries, &caller.username, &mut batch)?;

        if !batch.is_empty() {
            self.repo
                .upsert_batch(&batch)
                .await
                .map_err(map_shipment_error)?;
        }

        let summary = IngestionSummary {
            pickup_upserted: count(batch.pickups().len()),
            delivery_upserted: count(batch.deliveries().len()),
            pickup_skipped,
            delivery_skipped,
        };
        info!(
            by = %caller.username,
            pickup_upserted = summary.pickup_upserted,
            delivery_upserted = summary.delivery_upserted,
            pickup_skipped,
            delivery_skipped,
            "ingested workbook"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "ingestion_service_tests.rs"]
mod tests;

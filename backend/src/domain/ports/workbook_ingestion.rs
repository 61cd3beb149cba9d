//! Driving port for bulk spreadsheet uploads.

use async_trait::async_trait;

use crate::domain::{Error, Identity, IngestionSummary};

/// All-or-nothing ingestion of one uploaded workbook.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkbookIngestion: Send + Sync {
    /// Decode, validate and upsert every row of the `Pickup` and `Delivery`
    /// sheets in one transaction.
    ///
    /// Fails with `invalid_workbook` for unreadable bytes and with
    /// `invalid_request` for a missing sheet or a rejected cell; nothing is
    /// written in either case.
    async fn ingest(&self, caller: &Identity, bytes: Vec<u8>) -> Result<IngestionSummary, Error>;
}

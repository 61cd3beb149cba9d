//! Manually entered daily statistics, one row per calendar date.

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::shipment::EventDate;
use super::user::Username;

/// Counters submitted for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ManualStats {
    /// Calendar date the counters describe.
    pub date: EventDate,
    /// Successful deliveries.
    pub delivery_success: u32,
    /// Deliveries still pending.
    pub delivery_pending: u32,
    /// Successful pickups.
    pub pickup_success: u32,
    /// Failed pickups.
    pub pickup_failed: u32,
    /// Parcels carrying a COD amount.
    pub cod_packages_count: u32,
    /// Account that submitted the counters.
    #[schema(value_type = String, example = "budi")]
    pub submitted_by: Username,
}

/// Stored manual stats row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredManualStats {
    /// Row identifier.
    pub id: i32,
    /// Counters for the date.
    #[serde(flatten)]
    pub stats: ManualStats,
    /// When the row was first created.
    #[schema(value_type = String, example = "2024-07-20T08:30:00")]
    pub created_at: NaiveDateTime,
}

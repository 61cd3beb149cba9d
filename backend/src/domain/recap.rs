//! Per-user activity recap.
//!
//! Storage returns grouped tallies for each record kind; [`build_recap`]
//! merges them with outer-join semantics so a user seen in only one kind
//! still gets a row with zeroes for the other.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::shipment::DeliveryStatus;
use super::user::Username;

/// Pickups grouped by submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupTally {
    /// Submitting user.
    pub submitted_by: Username,
    /// Number of pickup rows.
    pub count: u64,
}

/// Deliveries grouped by submitter and status.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryTally {
    /// Submitting user.
    pub submitted_by: Username,
    /// Delivery outcome shared by the grouped rows.
    pub status: DeliveryStatus,
    /// Number of delivery rows.
    pub count: u64,
    /// Sum of COD amounts over the grouped rows.
    pub cod_sum: f64,
}

/// One recap line.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecapRow {
    /// Submitting user.
    #[schema(value_type = String, example = "budi")]
    pub username: Username,
    /// Pickups submitted.
    pub pickup_count: u64,
    /// Deliveries with status `Terkirim`.
    pub delivery_success_count: u64,
    /// Deliveries with status `Gagal`.
    pub delivery_failed_count: u64,
    /// COD collected across all of the user's deliveries.
    pub total_cod: f64,
}

impl RecapRow {
    fn empty(username: Username) -> Self {
        Self {
            username,
            pickup_count: 0,
            delivery_success_count: 0,
            delivery_failed_count: 0,
            total_cod: 0.0,
        }
    }
}

/// Merge tallies into one row per username, ordered by username.
///
/// # Examples
/// ```
/// use courier_backend::domain::{build_recap, PickupTally, Username};
///
/// let rows = build_recap(
///     vec![PickupTally { submitted_by: Username::new("budi").unwrap(), count: 3 }],
///     vec![],
/// );
/// assert_eq!(rows[0].pickup_count, 3);
/// assert_eq!(rows[0].delivery_success_count, 0);
/// ```
pub fn build_recap(pickups: Vec<PickupTally>, deliveries: Vec<DeliveryTally>) -> Vec<RecapRow> {
    let mut rows: BTreeMap<Username, RecapRow> = BTreeMap::new();

    for tally in pickups {
        let row = rows
            .entry(tally.submitted_by.clone())
            .or_insert_with(|| RecapRow::empty(tally.submitted_by));
        row.pickup_count = row.pickup_count.saturating_add(tally.count);
    }

    for tally in deliveries {
        let row = rows
            .entry(tally.submitted_by.clone())
            .or_insert_with(|| RecapRow::empty(tally.submitted_by));
        match tally.status {
            DeliveryStatus::Terkirim => {
                row.delivery_success_count = row.delivery_success_count.saturating_add(tally.count);
            }
            DeliveryStatus::Gagal => {
                row.delivery_failed_count = row.delivery_failed_count.saturating_add(tally.count);
            }
            DeliveryStatus::Proses => {}
        }
        row.total_cod += tally.cod_sum;
    }

    rows.into_values().collect()
}

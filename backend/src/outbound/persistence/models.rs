//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate the
//! stored text, so a hand-edited database cannot smuggle invalid values past
//! the domain constructors.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    Awb, CodAmount, DeliveryRecord, DeliveryStatus, EventDate, ManualStats, PickupRecord, Role,
    StoredManualStats, User, UserId, Username,
};

use super::schema::{delivery, manual_stats, pickup, users};

/// Raised when a stored row no longer satisfies domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row is invalid: {message}")]
pub(crate) struct RowConversionError {
    table: &'static str,
    message: String,
}

impl RowConversionError {
    fn new(table: &'static str, message: impl ToString) -> Self {
        Self {
            table,
            message: message.to_string(),
        }
    }
}

fn optional_date(
    table: &'static str,
    raw: Option<String>,
) -> Result<Option<EventDate>, RowConversionError> {
    raw.map(|value| EventDate::parse(&value).map_err(|err| RowConversionError::new(table, err)))
        .transpose()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl UserRow {
    pub(crate) fn to_user(&self) -> Result<User, RowConversionError> {
        Ok(User {
            id: UserId::new(self.id),
            username: Username::new(&self.username)
                .map_err(|err| RowConversionError::new("users", err))?,
            role: self
                .role
                .parse::<Role>()
                .map_err(|err| RowConversionError::new("users", err))?,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Pickup
// ---------------------------------------------------------------------------

/// Row struct for the pickup table, used for reads and writes alike.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = pickup, primary_key(awb))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PickupRow {
    pub awb: String,
    pub recipient_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub event_date: Option<String>,
    pub submitted_by: String,
}

impl From<&PickupRecord> for PickupRow {
    fn from(record: &PickupRecord) -> Self {
        Self {
            awb: record.awb.to_string(),
            recipient_name: record.recipient_name.clone(),
            address: record.address.clone(),
            phone: record.phone.clone(),
            event_date: record.event_date.map(|date| date.to_string()),
            submitted_by: record.submitted_by.to_string(),
        }
    }
}

impl TryFrom<PickupRow> for PickupRecord {
    type Error = RowConversionError;

    fn try_from(row: PickupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            awb: Awb::new(&row.awb).map_err(|err| RowConversionError::new("pickup", err))?,
            recipient_name: row.recipient_name,
            address: row.address,
            phone: row.phone,
            event_date: optional_date("pickup", row.event_date)?,
            submitted_by: Username::new(&row.submitted_by)
                .map_err(|err| RowConversionError::new("pickup", err))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Row struct for the delivery table, used for reads and writes alike.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = delivery, primary_key(awb))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct DeliveryRow {
    pub awb: String,
    pub status: String,
    pub event_date: Option<String>,
    pub submitted_by: String,
    pub cod_amount: f64,
}

impl From<&DeliveryRecord> for DeliveryRow {
    fn from(record: &DeliveryRecord) -> Self {
        Self {
            awb: record.awb.to_string(),
            status: record.status.as_str().to_owned(),
            event_date: record.event_date.map(|date| date.to_string()),
            submitted_by: record.submitted_by.to_string(),
            cod_amount: record.cod_amount.value(),
        }
    }
}

impl TryFrom<DeliveryRow> for DeliveryRecord {
    type Error = RowConversionError;

    fn try_from(row: DeliveryRow) -> Result<Self, Self::Error> {
        let invalid = |err: &dyn std::fmt::Display| RowConversionError::new("delivery", err);
        Ok(Self {
            awb: Awb::new(&row.awb).map_err(|err| invalid(&err))?,
            status: row.status.parse::<DeliveryStatus>().map_err(|err| invalid(&err))?,
            event_date: optional_date("delivery", row.event_date)?,
            submitted_by: Username::new(&row.submitted_by).map_err(|err| invalid(&err))?,
            cod_amount: CodAmount::new(row.cod_amount).map_err(|err| invalid(&err))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Manual stats
// ---------------------------------------------------------------------------

/// Row struct for reading from the manual_stats table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = manual_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ManualStatsRow {
    pub id: i32,
    pub date: String,
    pub delivery_success: i64,
    pub delivery_pending: i64,
    pub pickup_success: i64,
    pub pickup_failed: i64,
    pub cod_packages_count: i64,
    pub submitted_by: String,
    pub created_at: NaiveDateTime,
}

fn counter(value: i64) -> Result<u32, RowConversionError> {
    u32::try_from(value).map_err(|err| RowConversionError::new("manual_stats", err))
}

impl TryFrom<ManualStatsRow> for StoredManualStats {
    type Error = RowConversionError;

    fn try_from(row: ManualStatsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            stats: ManualStats {
                date: EventDate::parse(&row.date)
                    .map_err(|err| RowConversionError::new("manual_stats", err))?,
                delivery_success: counter(row.delivery_success)?,
                delivery_pending: counter(row.delivery_pending)?,
                pickup_success: counter(row.pickup_success)?,
                pickup_failed: counter(row.pickup_failed)?,
                cod_packages_count: counter(row.cod_packages_count)?,
                submitted_by: Username::new(&row.submitted_by)
                    .map_err(|err| RowConversionError::new("manual_stats", err))?,
            },
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for manual stats; also the changeset applied on a date
/// conflict.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = manual_stats)]
pub(crate) struct NewManualStatsRow {
    pub date: String,
    pub delivery_success: i64,
    pub delivery_pending: i64,
    pub pickup_success: i64,
    pub pickup_failed: i64,
    pub cod_packages_count: i64,
    pub submitted_by: String,
}

impl From<&ManualStats> for NewManualStatsRow {
    fn from(stats: &ManualStats) -> Self {
        Self {
            date: stats.date.to_string(),
            delivery_success: i64::from(stats.delivery_success),
            delivery_pending: i64::from(stats.delivery_pending),
            pickup_success: i64::from(stats.pickup_success),
            pickup_failed: i64::from(stats.pickup_failed),
            cod_packages_count: i64::from(stats.cod_packages_count),
            submitted_by: stats.submitted_by.to_string(),
        }
    }
}

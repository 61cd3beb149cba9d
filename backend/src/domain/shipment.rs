//! Shipment records: the pickup and delivery events keyed by airway bill.
//!
//! Both kinds share the AWB namespace but are stored and mutated
//! independently. Field names on the wire follow the spreadsheet headers that
//! operators upload (`AWB`, `Nama`, `Tanggal`, ...), so the JSON a client reads
//! matches the columns it writes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Username;
use super::workbook::{RowError, SheetRow};

/// Longest accepted airway bill number, in characters.
pub const AWB_MAX: usize = 64;

/// Validation errors for [`Awb`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AwbValidationError {
    /// Blank once trimmed.
    #[error("AWB must not be empty")]
    Empty,
    /// Longer than [`AWB_MAX`] characters.
    #[error("AWB must be at most {max} characters")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Airway bill number: the business key of every shipment record.
///
/// # Examples
/// ```
/// use courier_backend::domain::Awb;
///
/// let awb = Awb::new(" JNE0001 ").expect("valid AWB");
/// assert_eq!(awb.as_ref(), "JNE0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct Awb(String);

impl Awb {
    /// Validate and normalise an airway bill number.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AwbValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AwbValidationError::Empty);
        }
        if trimmed.chars().count() > AWB_MAX {
            return Err(AwbValidationError::TooLong { max: AWB_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Awb {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Awb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Awb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Raised when a date is not an ISO `YYYY-MM-DD` calendar date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a YYYY-MM-DD date")]
pub struct EventDateParseError {
    /// Rejected input.
    pub value: String,
}

/// Calendar date of a shipment event, rendered as `YYYY-MM-DD`.
///
/// Dates are stored as text so filtering is a literal string match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String, format = Date, example = "2024-07-20")]
pub struct EventDate(NaiveDate);

const ISO_DATE: &str = "%Y-%m-%d";

impl EventDate {
    /// Wrap a calendar date.
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a strict `YYYY-MM-DD` string.
    ///
    /// # Examples
    /// ```
    /// use courier_backend::domain::EventDate;
    ///
    /// assert!(EventDate::parse("2024-07-20").is_ok());
    /// assert!(EventDate::parse("20/07/2024").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EventDateParseError> {
        let trimmed = raw.trim();
        let well_formed = trimmed.len() == 10;
        NaiveDate::parse_from_str(trimmed, ISO_DATE)
            .ok()
            .filter(|_| well_formed)
            .map(Self)
            .ok_or_else(|| EventDateParseError {
                value: raw.to_owned(),
            })
    }

    /// Convert a spreadsheet date serial (days since 1899-12-30).
    ///
    /// Any time-of-day fraction is dropped. Returns `None` for serials outside
    /// the range spreadsheets can represent.
    pub fn from_excel_serial(serial: f64) -> Option<Self> {
        const MAX_SERIAL: f64 = 2_958_465.0; // 9999-12-31
        if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let whole_days = format!("{:.0}", serial.trunc()).parse::<u64>().ok()?;
        epoch.checked_add_days(Days::new(whole_days)).map(Self)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE))
    }
}

impl FromStr for EventDate {
    type Err = EventDateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EventDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
pub enum DeliveryStatus {
    /// Delivered.
    Terkirim,
    /// Delivery failed.
    Gagal,
    /// Still in progress.
    #[default]
    Proses,
}

impl DeliveryStatus {
    /// Canonical capitalised form, as stored and serialised.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terkirim => "Terkirim",
            Self::Gagal => "Gagal",
            Self::Proses => "Proses",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status is not one of `Terkirim`, `Gagal` or `Proses`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery status '{value}'; expected Terkirim, Gagal or Proses")]
pub struct DeliveryStatusParseError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for DeliveryStatus {
    type Err = DeliveryStatusParseError;

    /// Case-insensitive parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terkirim" => Ok(Self::Terkirim),
            "gagal" => Ok(Self::Gagal),
            "proses" => Ok(Self::Proses),
            _ => Err(DeliveryStatusParseError {
                value: s.to_owned(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for DeliveryStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Validation errors for [`CodAmount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodAmountValidationError {
    /// NaN or infinite.
    #[error("COD amount must be a finite number")]
    NotFinite,
    /// Below zero.
    #[error("COD amount must not be negative")]
    Negative,
}

/// Cash collected on delivery: finite and non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = f64, example = 150000.0)]
pub struct CodAmount(f64);

impl CodAmount {
    /// Validate an amount.
    ///
    /// # Examples
    /// ```
    /// use courier_backend::domain::CodAmount;
    ///
    /// assert!(CodAmount::new(25_000.0).is_ok());
    /// assert!(CodAmount::new(-1.0).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, CodAmountValidationError> {
        if !value.is_finite() {
            return Err(CodAmountValidationError::NotFinite);
        }
        if value < 0.0 {
            return Err(CodAmountValidationError::Negative);
        }
        // Normalise -0.0 so it renders as 0.
        Ok(Self(value.abs()))
    }

    /// Amount as a float.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for CodAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// The two record kinds held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Pickup events.
    Pickup,
    /// Delivery events.
    Delivery,
}

impl RecordKind {
    /// Lowercase identifier used in routes and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }

    /// Worksheet name an upload must carry for this kind.
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::Pickup => "Pickup",
            Self::Delivery => "Delivery",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parcel collected from a sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PickupRecord {
    /// Airway bill number.
    #[serde(rename = "AWB")]
    #[schema(value_type = String, example = "JNE0001")]
    pub awb: Awb,
    /// Recipient name.
    #[serde(rename = "Nama")]
    pub recipient_name: Option<String>,
    /// Recipient address.
    #[serde(rename = "Alamat")]
    pub address: Option<String>,
    /// Recipient phone number.
    #[serde(rename = "No. HP")]
    pub phone: Option<String>,
    /// Pickup date.
    #[serde(rename = "Tanggal")]
    pub event_date: Option<EventDate>,
    /// Account that last wrote this record.
    #[serde(rename = "User")]
    #[schema(value_type = String)]
    pub submitted_by: Username,
}

/// A delivery attempt for a parcel.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeliveryRecord {
    /// Airway bill number.
    #[serde(rename = "AWB")]
    #[schema(value_type = String, example = "JNE0001")]
    pub awb: Awb,
    /// Delivery outcome.
    #[serde(rename = "Status")]
    pub status: DeliveryStatus,
    /// Delivery date.
    #[serde(rename = "Tanggal")]
    pub event_date: Option<EventDate>,
    /// Account that last wrote this record.
    #[serde(rename = "User")]
    #[schema(value_type = String)]
    pub submitted_by: Username,
    /// Cash collected on delivery.
    #[serde(rename = "COD Amount")]
    pub cod_amount: CodAmount,
}

/// Editable pickup fields supplied by a single-record create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupFields {
    /// Recipient name.
    pub recipient_name: Option<String>,
    /// Recipient address.
    pub address: Option<String>,
    /// Recipient phone number.
    pub phone: Option<String>,
    /// Pickup date; required for manual entry.
    pub event_date: EventDate,
}

/// Editable delivery fields supplied by a single-record create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryFields {
    /// Delivery outcome.
    pub status: DeliveryStatus,
    /// Delivery date; required for manual entry.
    pub event_date: EventDate,
    /// Cash collected on delivery.
    pub cod_amount: CodAmount,
}

impl PickupRecord {
    /// Build a record written by `submitted_by`.
    pub fn from_fields(awb: Awb, fields: PickupFields, submitted_by: Username) -> Self {
        let PickupFields {
            recipient_name,
            address,
            phone,
            event_date,
        } = fields;
        Self {
            awb,
            recipient_name,
            address,
            phone,
            event_date: Some(event_date),
            submitted_by,
        }
    }
}

impl DeliveryRecord {
    /// Build a record written by `submitted_by`.
    pub fn from_fields(awb: Awb, fields: DeliveryFields, submitted_by: Username) -> Self {
        let DeliveryFields {
            status,
            event_date,
            cod_amount,
        } = fields;
        Self {
            awb,
            status,
            event_date: Some(event_date),
            submitted_by,
            cod_amount,
        }
    }
}

/// Records staged for one atomic bulk write.
///
/// Staging the same AWB twice keeps the position of the first occurrence and
/// the values of the last, which is what applying the upserts in order would
/// leave behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertBatch {
    pickups: Vec<PickupRecord>,
    deliveries: Vec<DeliveryRecord>,
    pickup_index: HashMap<Awb, usize>,
    delivery_index: HashMap<Awb, usize>,
}

fn stage<T>(rows: &mut Vec<T>, index: &mut HashMap<Awb, usize>, awb: &Awb, record: T) {
    match index.get(awb).and_then(|&position| rows.get_mut(position)) {
        Some(slot) => *slot = record,
        None => {
            index.insert(awb.clone(), rows.len());
            rows.push(record);
        }
    }
}

impl UpsertBatch {
    /// Empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage any record kind.
    pub fn upsert<K: ShipmentKind>(&mut self, record: K) {
        record.upsert(self);
    }

    fn stage_pickup(&mut self, record: PickupRecord) {
        let awb = record.awb.clone();
        stage(&mut self.pickups, &mut self.pickup_index, &awb, record);
    }

    fn stage_delivery(&mut self, record: DeliveryRecord) {
        let awb = record.awb.clone();
        stage(&mut self.deliveries, &mut self.delivery_index, &awb, record);
    }

    /// Pickups to write, one per AWB.
    pub fn pickups(&self) -> &[PickupRecord] {
        &self.pickups
    }

    /// Deliveries to write, one per AWB.
    pub fn deliveries(&self) -> &[DeliveryRecord] {
        &self.deliveries
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty() && self.deliveries.is_empty()
    }
}

/// Capabilities every shipment record kind provides to the ingestion
/// pipeline.
pub trait ShipmentKind: Sized + Send + 'static {
    /// Which kind this is.
    const KIND: RecordKind;

    /// Validate one spreadsheet row.
    ///
    /// Returns `Ok(None)` when the row has no AWB and must be skipped. A blank
    /// `User` cell attributes the row to `acting_user`.
    fn validate(row: &SheetRow, acting_user: &Username) -> Result<Option<Self>, RowError>;

    /// Stage the record into a bulk write.
    fn upsert(self, batch: &mut UpsertBatch);

    /// Business key.
    fn awb(&self) -> &Awb;
}

/// Every stored record of both kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDump {
    /// All pickups.
    pub pickup_data: Vec<PickupRecord>,
    /// All deliveries.
    pub delivery_data: Vec<DeliveryRecord>,
}

/// Rows removed when an AWB is purged from both kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PurgeCounts {
    /// Pickup rows removed (0 or 1).
    pub pickup_removed: u64,
    /// Delivery rows removed (0 or 1).
    pub delivery_removed: u64,
}

/// Spreadsheet headers for each record kind.
pub mod columns {
    /// Airway bill number.
    pub const AWB: &str = "AWB";
    /// Recipient name.
    pub const NAME: &str = "Nama";
    /// Recipient address.
    pub const ADDRESS: &str = "Alamat";
    /// Recipient phone.
    pub const PHONE: &str = "No. HP";
    /// Event date.
    pub const DATE: &str = "Tanggal";
    /// Submitting user.
    pub const USER: &str = "User";
    /// Delivery status.
    pub const STATUS: &str = "Status";
    /// Cash-on-delivery amount.
    pub const COD: &str = "COD Amount";
}

fn submitter(row: &SheetRow, acting_user: &Username) -> Result<Username, RowError> {
    Ok(row
        .username(columns::USER)?
        .unwrap_or_else(|| acting_user.clone()))
}

impl ShipmentKind for PickupRecord {
    const KIND: RecordKind = RecordKind::Pickup;

    fn validate(row: &SheetRow, acting_user: &Username) -> Result<Option<Self>, RowError> {
        let Some(awb) = row.awb(columns::AWB)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            awb,
            recipient_name: row.text(columns::NAME),
            address: row.text(columns::ADDRESS),
            phone: row.text(columns::PHONE),
            event_date: row.date(columns::DATE)?,
            submitted_by: submitter(row, acting_user)?,
        }))
    }

    fn upsert(self, batch: &mut UpsertBatch) {
        batch.stage_pickup(self);
    }

    fn awb(&self) -> &Awb {
        &self.awb
    }
}

impl ShipmentKind for DeliveryRecord {
    const KIND: RecordKind = RecordKind::Delivery;

    fn validate(row: &SheetRow, acting_user: &Username) -> Result<Option<Self>, RowError> {
        let Some(awb) = row.awb(columns::AWB)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            awb,
            status: row.status(columns::STATUS)?,
            event_date: row.date(columns::DATE)?,
            submitted_by: submitter(row, acting_user)?,
            cod_amount: row.amount(columns::COD)?,
        }))
    }

    fn upsert(self, batch: &mut UpsertBatch) {
        batch.stage_delivery(self);
    }

    fn awb(&self) -> &Awb {
        &self.awb
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn pickup(awb: &str, name: &str) -> PickupRecord {
        PickupRecord {
            awb: Awb::new(awb).expect("valid AWB"),
            recipient_name: Some(name.to_owned()),
            address: None,
            phone: None,
            event_date: None,
            submitted_by: Username::new("budi").expect("valid username"),
        }
    }

    #[rstest]
    #[case("", AwbValidationError::Empty)]
    #[case("  ", AwbValidationError::Empty)]
    #[case(&"9".repeat(AWB_MAX + 1), AwbValidationError::TooLong { max: AWB_MAX })]
    fn awb_rejects_invalid_values(#[case] raw: &str, #[case] expected: AwbValidationError) {
        assert_eq!(Awb::new(raw), Err(expected));
    }

    #[rstest]
    #[case("2024-07-20")]
    #[case(" 2024-02-29 ")]
    fn event_date_accepts_iso_dates(#[case] raw: &str) {
        let date = EventDate::parse(raw).expect("valid date");
        assert_eq!(date.to_string(), raw.trim());
    }

    #[rstest]
    #[case("2023-02-29")]
    #[case("20-07-2024")]
    #[case("2024-7-20")]
    #[case("2024-07-20T10:00:00")]
    #[case("")]
    fn event_date_rejects_other_forms(#[case] raw: &str) {
        assert!(EventDate::parse(raw).is_err());
    }

    #[rstest]
    #[case(45_493.0, "2024-07-20")]
    #[case(45_493.75, "2024-07-20")]
    #[case(61.0, "1900-03-01")]
    fn event_date_converts_excel_serials(#[case] serial: f64, #[case] expected: &str) {
        let date = EventDate::from_excel_serial(serial).expect("convertible serial");
        assert_eq!(date.to_string(), expected);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    #[case(3_000_000.0)]
    fn event_date_rejects_out_of_range_serials(#[case] serial: f64) {
        assert!(EventDate::from_excel_serial(serial).is_none());
    }

    #[rstest]
    #[case("Terkirim", DeliveryStatus::Terkirim)]
    #[case("terkirim", DeliveryStatus::Terkirim)]
    #[case(" GAGAL ", DeliveryStatus::Gagal)]
    #[case("Proses", DeliveryStatus::Proses)]
    fn delivery_status_parses_case_insensitively(
        #[case] raw: &str,
        #[case] expected: DeliveryStatus,
    ) {
        assert_eq!(raw.parse::<DeliveryStatus>(), Ok(expected));
    }

    #[rstest]
    fn delivery_status_rejects_unknown_values() {
        assert!("Hilang".parse::<DeliveryStatus>().is_err());
    }

    #[rstest]
    #[case(-0.01, Some(CodAmountValidationError::Negative))]
    #[case(f64::INFINITY, Some(CodAmountValidationError::NotFinite))]
    #[case(0.0, None)]
    #[case(150_000.0, None)]
    fn cod_amount_validation(
        #[case] value: f64,
        #[case] expected: Option<CodAmountValidationError>,
    ) {
        assert_eq!(CodAmount::new(value).err(), expected);
    }

    #[rstest]
    fn pickup_serialises_with_sheet_headers() {
        let mut record = pickup("JNE0001", "Ani");
        record.event_date = Some(EventDate::parse("2024-07-20").expect("valid date"));
        let value = serde_json::to_value(&record).expect("serialise pickup");
        assert_eq!(
            value,
            serde_json::json!({
                "AWB": "JNE0001",
                "Nama": "Ani",
                "Alamat": null,
                "No. HP": null,
                "Tanggal": "2024-07-20",
                "User": "budi"
            })
        );
    }

    #[rstest]
    fn delivery_serialises_with_sheet_headers() {
        let record = DeliveryRecord {
            awb: Awb::new("JNE0001").expect("valid AWB"),
            status: DeliveryStatus::Gagal,
            event_date: None,
            submitted_by: Username::new("budi").expect("valid username"),
            cod_amount: CodAmount::new(50_000.0).expect("valid amount"),
        };
        let value = serde_json::to_value(&record).expect("serialise delivery");
        assert_eq!(value.get("Status"), Some(&serde_json::json!("Gagal")));
        assert_eq!(value.get("COD Amount"), Some(&serde_json::json!(50_000.0)));
    }

    #[rstest]
    fn batch_keeps_last_values_for_repeated_awb() {
        let mut batch = UpsertBatch::new();
        batch.upsert(pickup("A1", "first"));
        batch.upsert(pickup("B2", "other"));
        batch.upsert(pickup("A1", "second"));

        let names: Vec<_> = batch
            .pickups()
            .iter()
            .map(|p| (p.awb.as_ref(), p.recipient_name.as_deref()))
            .collect();
        assert_eq!(names, vec![("A1", Some("second")), ("B2", Some("other"))]);
        assert!(batch.deliveries().is_empty());
    }
}

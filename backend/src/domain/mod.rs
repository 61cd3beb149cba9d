//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the driving ports. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Username, Role: accounts and authorisation.
//! - PickupRecord, DeliveryRecord and their value types: the ledger.
//! - Workbook, Sheet, SheetRow: decoded uploads.
//! - AccountService, ShipmentService, IngestionService, ManualStatsService.

pub mod auth;
pub mod error;
pub mod listing;
pub mod manual_stats;
pub mod ports;
pub mod recap;
pub mod shipment;
pub mod trace_id;
pub mod user;
pub mod workbook;

mod account_service;
mod ingestion_service;
mod manual_stats_service;
mod shipment_service;

pub use self::account_service::AccountService;
pub use self::auth::{
    Identity, IssuedSession, LoginCredentials, LoginValidationError, PasswordHash, SessionToken,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ingestion_service::{IngestionService, IngestionSummary};
pub use self::listing::{RecordFilter, RecordFilterError, SearchTerm};
pub use self::manual_stats::{ManualStats, StoredManualStats};
pub use self::manual_stats_service::ManualStatsService;
pub use self::recap::{DeliveryTally, PickupTally, RecapRow, build_recap};
pub use self::shipment::{
    Awb, AwbValidationError, CodAmount, CodAmountValidationError, DeliveryFields, DeliveryRecord,
    DeliveryStatus, DeliveryStatusParseError, EventDate, EventDateParseError, PickupFields,
    PickupRecord, PurgeCounts, RecordKind, ShipmentDump, ShipmentKind, UpsertBatch,
};
pub use self::shipment_service::ShipmentService;
pub use self::trace_id::TraceId;
pub use self::user::{Role, RoleParseError, User, UserId, Username, UsernameValidationError};
pub use self::workbook::{CellValue, RowError, Sheet, SheetRow, Workbook};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use courier_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

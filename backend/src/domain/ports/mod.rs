//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod manual_stats_command;
mod manual_stats_repository;
mod password_hasher;
mod session_token_codec;
mod session_verifier;
mod shipment_command;
mod shipment_query;
mod shipment_repository;
mod user_administration;
mod user_repository;
mod workbook_ingestion;
mod workbook_reader;

pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use manual_stats_command::{ManualStatsCommand, ManualStatsQuery};
#[cfg(test)]
pub use manual_stats_command::{MockManualStatsCommand, MockManualStatsQuery};
#[cfg(test)]
pub use manual_stats_repository::MockManualStatsRepository;
pub use manual_stats_repository::{ManualStatsPersistenceError, ManualStatsRepository};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use session_token_codec::MockSessionTokenCodec;
pub use session_token_codec::{SessionTokenCodec, SessionTokenError};
#[cfg(test)]
pub use session_verifier::MockSessionVerifier;
pub use session_verifier::SessionVerifier;
#[cfg(test)]
pub use shipment_command::MockShipmentCommand;
pub use shipment_command::ShipmentCommand;
#[cfg(test)]
pub use shipment_query::MockShipmentQuery;
pub use shipment_query::ShipmentQuery;
#[cfg(test)]
pub use shipment_repository::MockShipmentRepository;
pub use shipment_repository::{RecordSlice, ShipmentPersistenceError, ShipmentRepository};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::UserAdministration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUser, UserAccount, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use workbook_ingestion::MockWorkbookIngestion;
pub use workbook_ingestion::WorkbookIngestion;
#[cfg(test)]
pub use workbook_reader::MockWorkbookReader;
pub use workbook_reader::{WorkbookReadError, WorkbookReader};

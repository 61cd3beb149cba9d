//! Builders wiring repository-backed services into HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use courier_backend::domain::{
    AccountService, IngestionService, ManualStatsService, ShipmentService,
};
use courier_backend::inbound::http::state::{HttpState, HttpStatePorts};
use courier_backend::outbound::persistence::{
    DbPool, DieselManualStatsRepository, DieselShipmentRepository, DieselUserRepository,
};
use courier_backend::outbound::security::{BcryptPasswordHasher, JwtSessionCodec};
use courier_backend::outbound::spreadsheet::CalamineWorkbookReader;

use super::ServerConfig;

type Accounts = AccountService<DieselUserRepository, BcryptPasswordHasher, JwtSessionCodec>;

fn build_account_service(config: &ServerConfig) -> Arc<Accounts> {
    Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(config.db_pool.clone())),
        Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        Arc::new(JwtSessionCodec::new(&config.signing_key)),
        Arc::new(DefaultClock),
    ))
}

fn shipment_repository(pool: &DbPool) -> Arc<DieselShipmentRepository> {
    Arc::new(DieselShipmentRepository::new(pool.clone()))
}

/// Build the HTTP state with every port backed by the SQLite store.
///
/// One service instance implements each command/query pair so both sides
/// share the same repository handle.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let accounts = build_account_service(config);
    let shipments = Arc::new(ShipmentService::new(shipment_repository(&config.db_pool)));
    let ingestion = Arc::new(IngestionService::new(
        shipment_repository(&config.db_pool),
        Arc::new(CalamineWorkbookReader::new()),
    ));
    let manual_stats = Arc::new(ManualStatsService::new(Arc::new(
        DieselManualStatsRepository::new(config.db_pool.clone()),
    )));

    let state = HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        sessions: accounts.clone(),
        users: accounts,
        shipments: shipments.clone(),
        shipments_query: shipments,
        ingestion,
        manual_stats: manual_stats.clone(),
        manual_stats_query: manual_stats,
    })
    .with_upload_limit(config.upload_limit_bytes);
    web::Data::new(state)
}

//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod manual_stats;
pub mod recap;
pub mod records;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod upload;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

/// Render extractor failures as JSON `invalid_request` errors.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid path parameter: {err}")).into()
    }));
}

/// Register every `/api` endpoint on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use courier_backend::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);
    cfg.service(users::register)
        .service(users::login)
        .service(users::list_users)
        .service(users::delete_user)
        .service(users::update_user_role)
        .service(records::list_pickups)
        .service(records::list_deliveries)
        .service(records::create_pickup)
        .service(records::create_delivery)
        .service(records::update_pickup)
        .service(records::update_delivery)
        .service(records::delete_pickup)
        .service(records::delete_delivery)
        .service(records::dump_records)
        .service(records::purge_record)
        .service(upload::upload_workbook)
        .service(manual_stats::list_manual_stats)
        .service(manual_stats::record_manual_stats)
        .service(recap::recap);
}

/// Register the readiness and liveness probes on `cfg`.
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live);
}

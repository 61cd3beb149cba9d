//! HTTP server assembly: app factory, listener and shutdown handling.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use courier_backend::Trace;
#[cfg(debug_assertions)]
use courier_backend::doc::ApiDoc;
use courier_backend::inbound::http::health::HealthState;
use courier_backend::inbound::http::state::HttpState;
use courier_backend::inbound::http::{configure_api, configure_health};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Seconds in-flight requests get to finish after shutdown starts.
const SHUTDOWN_GRACE_SECS: u64 = 15;

fn courier_app(
    health: web::Data<HealthState>,
    http: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health)
        .app_data(http)
        .wrap(Trace)
        .service(web::scope("/api").configure(configure_api))
        .configure(configure_health);

    // Swagger UI is only served from debug builds.
    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Flip readiness to draining on Ctrl-C, then stop the server gracefully.
fn drain_on_interrupt(server: &Server, health: web::Data<HealthState>) {
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for the interrupt signal");
            return;
        }
        info!("interrupt received, draining");
        health.mark_draining();
        handle.stop(true).await;
    });
}

/// Bind the listener and start serving.
///
/// Readiness turns on once the socket is bound.
///
/// # Errors
/// Returns the [`std::io::Error`] raised while binding `config.bind_addr`.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let factory_health = health_state.clone();

    let server = HttpServer::new(move || courier_app(factory_health.clone(), http_state.clone()))
        .bind(config.bind_addr)?
        .disable_signals()
        .shutdown_timeout(SHUTDOWN_GRACE_SECS)
        .run();

    drain_on_interrupt(&server, health_state.clone());
    info!(bind_addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}

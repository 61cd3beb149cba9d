//! Backend entry-point: loads settings, prepares the SQLite store and serves
//! the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use courier_backend::inbound::http::health::HealthState;
use courier_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use courier_backend::outbound::security::{BuildMode, signing_key_from_env};

use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().context("load server settings")?;
    let signing_key = signing_key_from_env(
        &DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
        settings.jwt_secret(),
    )
    .context("resolve JWT signing key")?;
    info!(fingerprint = %signing_key.fingerprint(), "JWT signing key loaded");

    let database_path = settings.database_path();
    let database_url = database_path.to_string_lossy().into_owned();
    run_migrations(&database_url)
        .await
        .with_context(|| format!("migrate database at {}", database_path.display()))?;
    let pool_config = PoolConfig::new(&database_url).with_max_size(settings.pool_max_size);
    let db_pool = DbPool::new(pool_config)
        .await
        .context("open database pool")?;
    info!(path = %database_path.display(), "database ready");

    let config = ServerConfig::new(settings.bind_addr(), db_pool, signing_key)
        .with_bcrypt_cost(settings.bcrypt_cost)
        .with_upload_limit(settings.upload_limit_bytes());
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).context("start HTTP server")?;
    server.await.context("HTTP server failed")
}

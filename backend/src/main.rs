//! Server entry-point: loads settings, migrates the database and serves the
//! tracker API and pages.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use mytrucktracker::inbound::http::health::HealthState;
use mytrucktracker::inbound::http::session_config::{BuildMode, session_settings_from_env};
use mytrucktracker::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use mytrucktracker::settings::TrackerSettings;

use server::{ServerConfig, build_outbound_adapters, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let settings = TrackerSettings::load().map_err(|err| eyre!("loading settings: {err}"))?;
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let database_url = settings.database_url(&env)?;
    run_migrations(&database_url)
        .await
        .wrap_err("applying migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_size()))
        .await
        .wrap_err("building database pool")?;

    let bind_addr = settings.bind_addr()?;
    let adapters = build_outbound_adapters(&settings, &env)?;
    let config = ServerConfig::new(session, bind_addr, pool, adapters)
        .with_public_base_url(settings.public_base_url());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await?;
    Ok(())
}


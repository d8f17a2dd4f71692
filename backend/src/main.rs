//! Backend entry-point: loads settings, prepares the database, provisions the
//! bootstrap administrator and serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roombook::inbound::http::health::HealthState;
use roombook::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use roombook::settings::AppSettings;

use server::{AppServices, ServerConfig, build_services, create_server};

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

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let database_url = settings.database_url()?;
    let bind_addr = settings.bind_addr()?;
    let bootstrap_admin = settings.bootstrap_admin()?;
    let login_throttle = settings.login_throttle()?;

    run_pending_migrations(database_url)
        .await
        .wrap_err("failed to migrate the database")?;

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections),
    )
    .await
    .wrap_err("failed to build the connection pool")?;

    let config = ServerConfig::new(
        bind_addr,
        pool,
        settings.jwt_secret()?,
        settings.token_ttl(),
    )
    .with_login_throttle(login_throttle);
    let AppServices {
        http_state,
        accounts,
    } = build_services(&config).wrap_err("invalid token settings")?;

    if let Some(admin) = bootstrap_admin {
        let user = accounts
            .ensure_bootstrap_admin(admin)
            .await
            .wrap_err("failed to provision the bootstrap administrator")?;
        info!(user_id = %user.id, "bootstrap administrator ready");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &config, http_state)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}

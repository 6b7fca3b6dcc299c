//! Service entry-point: loads settings, prepares storage, and serves the API.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use keyledger::config::AppSettings;
use keyledger::domain::{SigningKey, TokenCodec};
use keyledger::inbound::http::health::HealthState;
use keyledger::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use keyledger::outbound::sms::HttpSmsGateway;

use server::{ServerConfig, Storage, create_server, seed_admin, seeded_memory_store};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    let storage = match settings.database_url.as_deref() {
        Some(url) => Storage::Postgres(connect_postgres(url).await?),
        None => {
            warn!("no database url configured; using in-memory storage");
            let keys = settings.memory_keys().map_err(io::Error::other)?;
            Storage::Memory(seeded_memory_store(keys, &settings.memory_recipients()).await)
        }
    };

    let signing_key = match settings.token_secret.as_deref() {
        Some(secret) => SigningKey::from_secret(secret),
        None => {
            warn!("no token secret configured; using an ephemeral key (sessions end on restart)");
            SigningKey::generate()
        }
    };
    let tokens = TokenCodec::new(
        signing_key,
        settings.token_ttl_minutes().map_err(io::Error::other)?,
        Arc::new(DefaultClock),
    );

    let mut config = ServerConfig::new(bind_addr, storage, tokens)
        .with_message_format(settings.message_format().map_err(io::Error::other)?);
    if let Some((endpoint, credentials)) = settings.sms_gateway().map_err(io::Error::other)? {
        let gateway = HttpSmsGateway::new(endpoint, credentials, settings.sms_timeout())
            .map_err(io::Error::other)?;
        config = config.with_gateway(Arc::new(gateway));
    }

    let outcome = seed_admin(&config.storage, settings.admin_password())
        .await
        .map_err(io::Error::other)?;
    info!(outcome = ?outcome, "administrator account checked");

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting key ledger");
    create_server(health_state, config)?.await
}

async fn connect_postgres(url: &str) -> io::Result<DbPool> {
    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;
    info!(applied, "database migrations complete");
    DbPool::new(PoolConfig::new(url))
        .await
        .map_err(io::Error::other)
}

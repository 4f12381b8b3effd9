//! Backend entry-point: loads settings, wires the article store and identity
//! verifier, and serves the REST API with health probes.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use articles_backend::inbound::http::health::HealthState;
use articles_backend::outbound::persistence::{DbPool, PoolConfig};
use articles_backend::settings::ArticlesSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ArticlesSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let identity = settings
        .identity_backend(!cfg!(debug_assertions))
        .map_err(std::io::Error::other)?;

    let db_pool = match settings.database_url() {
        Some(url) => Some(
            DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|e| std::io::Error::other(format!("database setup failed: {e}")))?,
        ),
        None => None,
    };

    let config = ServerConfig::new(settings.bind_addr(), identity)
        .with_db_pool(db_pool)
        .with_seed_file(settings.seed_file().map(ToOwned::to_owned));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(bind_addr = settings.bind_addr(), "articles backend listening");

    let result = server.await;
    health_state.mark_draining();
    result
}

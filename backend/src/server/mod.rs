//! Server construction: builds the store and verifier, then serves the
//! shared application on every worker.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{build_http_state, build_identity_verifier};

use actix_web::dev::Server;
use actix_web::{HttpServer, web};

use articles_backend::inbound::http::health::HealthState;
use articles_backend::inbound::http::{AppDependencies, build_app};

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the store or verifier cannot be built,
/// or when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(build_http_state(&config)?),
        verifier: build_identity_verifier(&config.identity)?,
    };
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr.as_str())?
        .run();

    health_state.mark_serving();
    Ok(server)
}

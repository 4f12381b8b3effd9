//! Application assembly shared by the server binary and the HTTP test
//! harness.
//!
//! Article routes live under `/api` behind the [`IdentityGate`]; the health
//! probes sit outside it so orchestrators never need a token.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::IdentityVerifier;
use crate::inbound::http::articles::{add_comment, get_article, upvote_article};
use crate::inbound::http::error::json_config;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::identity::IdentityGate;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;

/// Everything [`build_app`] needs; cloned into every worker.
#[derive(Clone)]
pub struct AppDependencies {
    /// Lifecycle flag read by the probes.
    pub health_state: web::Data<HealthState>,
    /// Article use-cases.
    pub http_state: web::Data<HttpState>,
    /// Verifier behind the identity gate.
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// Build the application: trace ids on every response, JSON body errors in
/// the error envelope, article routes, probes, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        verifier,
    } = deps;

    let api = web::scope("/api")
        .wrap(IdentityGate::new(verifier))
        .service(get_article)
        .service(upvote_article)
        .service(add_comment);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

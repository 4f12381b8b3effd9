//! Shared harness for HTTP integration tests: an in-memory article store,
//! a fixture identity verifier, and the server's own application builder.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use articles_backend::domain::ports::{ArticleRepository, FixtureIdentityVerifier};
use articles_backend::domain::{Article, ArticleName, ArticleService, Identity, SubjectId};
use articles_backend::inbound::http::{self, AppDependencies};
use articles_backend::inbound::http::health::HealthState;
use articles_backend::inbound::http::state::HttpState;
use articles_backend::outbound::memory::InMemoryArticleRepository;

/// Token verified as subject `u1` with email `e@x.com`.
pub const U1_TOKEN: &str = "token-u1";
/// Token verified as subject `u2` with email `f@x.com`.
pub const U2_TOKEN: &str = "token-u2";
/// Token verified as subject `u3` without an email claim.
pub const NO_EMAIL_TOKEN: &str = "token-u3";

pub fn article_name(raw: &str) -> ArticleName {
    ArticleName::new(raw).expect("fixture article name")
}

pub fn identity(subject: &str, email: Option<&str>) -> Identity {
    Identity::new(
        SubjectId::new(subject).expect("fixture subject"),
        email.map(str::to_owned),
    )
}

/// Store holding the empty article `a`.
pub fn store_with_article_a() -> Arc<InMemoryArticleRepository> {
    Arc::new(InMemoryArticleRepository::with_articles([Article::new(
        article_name("a"),
    )]))
}

fn verifier() -> FixtureIdentityVerifier {
    FixtureIdentityVerifier::new()
        .with_identity(U1_TOKEN, identity("u1", Some("e@x.com")))
        .with_identity(U2_TOKEN, identity("u2", Some("f@x.com")))
        .with_identity(NO_EMAIL_TOKEN, identity("u3", None))
}

/// Build the application over `store`, marked as serving.
pub fn build_app<R>(
    store: Arc<R>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: ArticleRepository + 'static,
{
    let service = Arc::new(ArticleService::new(store));
    let health = HealthState::new();
    health.mark_serving();

    http::build_app(AppDependencies {
        health_state: web::Data::new(health),
        http_state: web::Data::new(HttpState::new(service.clone(), service)),
        verifier: Arc::new(verifier()),
    })
}

//! Builders for the article service and identity verifier behind the HTTP
//! adapter.

use std::io;
use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use articles_backend::domain::ports::{
    ArticleRepository, FixtureIdentityVerifier, IdentityVerifier,
};
use articles_backend::domain::{ArticleService, Identity, SubjectId};
use articles_backend::inbound::http::state::HttpState;
use articles_backend::outbound::identity::FirebaseTokenVerifier;
use articles_backend::outbound::memory::InMemoryArticleRepository;
use articles_backend::outbound::persistence::DieselArticleRepository;
use articles_backend::settings::IdentityBackend;

use super::ServerConfig;

/// Token accepted by the fixture verifier in development.
pub(crate) const DEV_TOKEN: &str = "dev-token";
const DEV_SUBJECT: &str = "dev-user";
const DEV_EMAIL: &str = "dev@localhost";

fn state_for<R>(repository: R) -> HttpState
where
    R: ArticleRepository + 'static,
{
    let service = Arc::new(ArticleService::new(Arc::new(repository)));
    HttpState::new(service.clone(), service)
}

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over the in-memory store (optionally seeded).
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<HttpState> {
    if let Some(pool) = &config.db_pool {
        info!("article store: postgresql");
        return Ok(state_for(DieselArticleRepository::new(pool.clone())));
    }

    let repository = match &config.seed_file {
        Some(path) => InMemoryArticleRepository::from_seed_file(path).map_err(io::Error::other)?,
        None => InMemoryArticleRepository::new(),
    };
    warn!("article store: in-memory; data is lost on restart");
    Ok(state_for(repository))
}

fn dev_identity() -> io::Result<Identity> {
    let subject = SubjectId::new(DEV_SUBJECT).map_err(io::Error::other)?;
    Ok(Identity::new(subject, Some(DEV_EMAIL.to_owned())))
}

/// Build the identity verifier selected by configuration.
pub(crate) fn build_identity_verifier(
    backend: &IdentityBackend,
) -> io::Result<Arc<dyn IdentityVerifier>> {
    match backend {
        IdentityBackend::Firebase {
            project_id,
            jwks_url,
            timeout,
        } => {
            info!(%project_id, "identity provider: firebase");
            let verifier = FirebaseTokenVerifier::new(
                project_id,
                jwks_url.clone(),
                *timeout,
                Arc::new(DefaultClock),
            )
            .map_err(|err| io::Error::other(format!("identity client setup failed: {err}")))?;
            Ok(Arc::new(verifier))
        }
        IdentityBackend::Fixture => {
            warn!(token = DEV_TOKEN, "identity provider: fixture; only the dev token is accepted");
            Ok(Arc::new(
                FixtureIdentityVerifier::new().with_identity(DEV_TOKEN, dev_identity()?),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use articles_backend::domain::AuthToken;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_backend_accepts_only_the_dev_token() {
        let verifier = build_identity_verifier(&IdentityBackend::Fixture).expect("verifier");
        let identity = verifier
            .verify(&AuthToken::new(DEV_TOKEN).expect("token"))
            .await
            .expect("dev token verifies");
        assert_eq!(identity.subject().as_ref(), DEV_SUBJECT);
        assert!(
            verifier
                .verify(&AuthToken::new("other").expect("token"))
                .await
                .is_err()
        );
    }

    #[rstest]
    fn missing_seed_file_fails_startup() {
        let config = ServerConfig::new("127.0.0.1:0", IdentityBackend::Fixture)
            .with_seed_file(Some("/nonexistent/articles.json".into()));
        assert!(build_http_state(&config).is_err());
    }
}

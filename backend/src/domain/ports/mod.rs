//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`ArticlesQuery`, `ArticlesCommand`) are called by inbound
//! adapters; driven ports (`ArticleRepository`, `IdentityVerifier`) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod article_repository;
mod articles_command;
mod articles_query;
mod identity_verifier;

#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use article_repository::{
    ArticleRepository, ArticleRepositoryError, FixtureArticleRepository, UpvoteOutcome,
};
pub use articles_command::ArticlesCommand;
pub use articles_query::ArticlesQuery;
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{FixtureIdentityVerifier, IdentityVerifier, IdentityVerifierError};

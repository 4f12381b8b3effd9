//! Driven port for bearer token verification.
//!
//! The identity provider is an external collaborator; HTTP adapters only see
//! this trait so tests can substitute deterministic verifiers.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AuthToken, Identity};

use super::define_port_error;

define_port_error! {
    /// Errors raised while verifying a token.
    pub enum IdentityVerifierError {
        /// The token is malformed, expired, or not signed by the provider.
        Rejected { message: String } =>
            "identity token rejected: {message}",
        /// The provider or its signing keys could not be reached.
        Unavailable { message: String } =>
            "identity provider unavailable: {message}",
    }
}

/// Port that turns an opaque token into a verified identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    async fn verify(&self, token: &AuthToken) -> Result<Identity, IdentityVerifierError>;
}

/// Verifier backed by a fixed token table, for tests and local development.
///
/// Tokens missing from the table are rejected.
#[derive(Debug, Default, Clone)]
pub struct FixtureIdentityVerifier {
    identities: HashMap<String, Identity>,
}

impl FixtureIdentityVerifier {
    /// A verifier that rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `identity`.
    #[must_use]
    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityVerifier for FixtureIdentityVerifier {
    async fn verify(&self, token: &AuthToken) -> Result<Identity, IdentityVerifierError> {
        self.identities
            .get(token.expose())
            .cloned()
            .ok_or_else(|| IdentityVerifierError::rejected("unknown fixture token"))
    }
}

//! Firebase ID token verification against Google's published signing keys.
//!
//! Tokens are RS256 JWTs whose `kid` header selects a key from the
//! `securetoken` JWK set. The set is cached and refetched once it is older
//! than an hour, or when a token names a key the cache does not hold and the
//! cache is at least a minute old.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use mockable::Clock;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::ports::{IdentityVerifier, IdentityVerifierError};
use crate::domain::{AuthToken, Identity, SubjectId};

/// Google endpoint publishing the Firebase token signing keys as a JWK set.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const KEY_TTL_SECS: i64 = 3_600;
const MIN_REFRESH_INTERVAL_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: DateTime<Utc>,
}

/// Verifies Firebase ID tokens issued for one project.
pub struct FirebaseTokenVerifier {
    client: Client,
    jwks_url: Url,
    validation: Validation,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    /// Build a verifier for `project_id` that fetches keys from `jwks_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        project_id: &str,
        jwks_url: Url,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        Ok(Self {
            client,
            jwks_url,
            validation,
            clock,
            cache: RwLock::new(None),
        })
    }

    async fn fetch_keys(&self) -> Result<JwkSet, IdentityVerifierError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| IdentityVerifierError::unavailable(format!("key fetch failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityVerifierError::unavailable(format!(
                "key endpoint answered {status}"
            )));
        }

        response.json::<JwkSet>().await.map_err(|err| {
            IdentityVerifierError::unavailable(format!("key set could not be decoded: {err}"))
        })
    }

    async fn cached_key(&self, kid: &str) -> Option<Result<DecodingKey, IdentityVerifierError>> {
        let now = self.clock.utc();
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        if is_stale(cached.fetched_at, now, key_ttl()) {
            return None;
        }
        match cached.keys.find(kid) {
            Some(jwk) => Some(decoding_key(jwk)),
            None if is_stale(cached.fetched_at, now, min_refresh_interval()) => None,
            None => Some(Err(unknown_key(kid))),
        }
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, IdentityVerifierError> {
        if let Some(found) = self.cached_key(kid).await {
            return found;
        }

        let mut cache = self.cache.write().await;
        let now = self.clock.utc();
        // Another request may have refreshed while this one waited for the lock.
        let refreshed_recently = cache
            .as_ref()
            .is_some_and(|cached| !is_stale(cached.fetched_at, now, min_refresh_interval()));
        if !refreshed_recently {
            let keys = self.fetch_keys().await?;
            info!(keys = keys.keys.len(), "refreshed identity provider signing keys");
            *cache = Some(CachedKeys {
                keys,
                fetched_at: now,
            });
        }

        let cached = cache
            .as_ref()
            .ok_or_else(|| IdentityVerifierError::unavailable("signing keys unavailable"))?;
        cached
            .keys
            .find(kid)
            .map(decoding_key)
            .unwrap_or_else(|| Err(unknown_key(kid)))
    }
}

fn key_ttl() -> TimeDelta {
    TimeDelta::seconds(KEY_TTL_SECS)
}

fn min_refresh_interval() -> TimeDelta {
    TimeDelta::seconds(MIN_REFRESH_INTERVAL_SECS)
}

/// Whether a key set fetched at `fetched_at` is older than `max_age` at `now`.
fn is_stale(fetched_at: DateTime<Utc>, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
    now.signed_duration_since(fetched_at) >= max_age
}

fn decoding_key(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, IdentityVerifierError> {
    DecodingKey::from_jwk(jwk).map_err(|err| {
        warn!(error = %err, "identity provider published an unusable key");
        IdentityVerifierError::unavailable("signing key could not be loaded")
    })
}

fn unknown_key(kid: &str) -> IdentityVerifierError {
    debug!(kid, "token names an unknown signing key");
    IdentityVerifierError::rejected("unknown signing key")
}

fn reject(reason: &str, err: jsonwebtoken::errors::Error) -> IdentityVerifierError {
    debug!(error = %err, reason, "token rejected");
    IdentityVerifierError::rejected(reason)
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &AuthToken) -> Result<Identity, IdentityVerifierError> {
        let raw = token.expose();
        let header = decode_header(raw).map_err(|err| reject("malformed token", err))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityVerifierError::rejected("unexpected signing algorithm"));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityVerifierError::rejected("token has no key id"))?;

        let key = self.signing_key(&kid).await?;
        let data = decode::<FirebaseClaims>(raw, &key, &self.validation)
            .map_err(|err| reject("token failed validation", err))?;

        let subject = SubjectId::new(data.claims.sub)
            .map_err(|err| IdentityVerifierError::rejected(err.to_string()))?;
        Ok(Identity::new(subject, data.claims.email))
    }
}

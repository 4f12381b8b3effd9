//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `ARTICLES_*` environment variables over an
//! optional configuration file. Every field is optional; accessors supply the
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::identity::DEFAULT_JWKS_URL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The key set URL could not be parsed.
    #[error("invalid jwks_url {url}: {message}")]
    InvalidJwksUrl {
        /// Offending value.
        url: String,
        /// Parser message.
        message: String,
    },
    /// Release builds need a real identity provider.
    #[error(
        "firebase_project_id is required; set allow_fixture_identity to run with fixture tokens"
    )]
    MissingProjectId,
}

/// Which identity verifier the server should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityBackend {
    /// Verify Firebase ID tokens for this project.
    Firebase {
        /// Firebase project id, used as audience and issuer suffix.
        project_id: String,
        /// Key set endpoint.
        jwks_url: Url,
        /// HTTP timeout for key set fetches.
        timeout: Duration,
    },
    /// Accept only the built-in development token.
    Fixture,
}

/// Configuration values for the articles service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARTICLES")]
pub struct ArticlesSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; without one the in-memory store is used.
    pub database_url: Option<String>,
    /// JSON array of article documents loaded into the in-memory store.
    pub seed_file: Option<PathBuf>,
    /// Firebase project whose ID tokens are accepted.
    pub firebase_project_id: Option<String>,
    /// Override for the signing key set endpoint.
    pub jwks_url: Option<String>,
    /// Timeout for key set fetches, in seconds.
    pub identity_timeout_secs: Option<u64>,
    /// Permit the fixture verifier when no project id is configured.
    #[ortho_config(default = false)]
    pub allow_fixture_identity: bool,
}

impl ArticlesSettings {
    /// Listen address, falling back to `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// PostgreSQL connection string, if configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Seed file for the in-memory store, if configured.
    pub fn seed_file(&self) -> Option<&Path> {
        self.seed_file.as_deref()
    }

    /// Key set fetch timeout, falling back to ten seconds.
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(
            self.identity_timeout_secs
                .unwrap_or(DEFAULT_IDENTITY_TIMEOUT_SECS),
        )
    }

    /// Key set endpoint, falling back to Google's secure-token keys.
    pub fn jwks_url(&self) -> Result<Url, SettingsError> {
        let raw = self.jwks_url.as_deref().unwrap_or(DEFAULT_JWKS_URL);
        Url::parse(raw).map_err(|err| SettingsError::InvalidJwksUrl {
            url: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Decide the identity verifier.
    ///
    /// Without a project id, debug builds fall back to the fixture verifier;
    /// release builds (`strict`) only do so when `allow_fixture_identity` is
    /// set.
    pub fn identity_backend(&self, strict: bool) -> Result<IdentityBackend, SettingsError> {
        let project_id = self
            .firebase_project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        match project_id {
            Some(project_id) => Ok(IdentityBackend::Firebase {
                project_id: project_id.to_owned(),
                jwks_url: self.jwks_url()?,
                timeout: self.identity_timeout(),
            }),
            None if strict && !self.allow_fixture_identity => Err(SettingsError::MissingProjectId),
            None => Ok(IdentityBackend::Fixture),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and identity selection.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "ARTICLES_BIND_ADDR",
        "ARTICLES_DATABASE_URL",
        "ARTICLES_SEED_FILE",
        "ARTICLES_FIREBASE_PROJECT_ID",
        "ARTICLES_JWKS_URL",
        "ARTICLES_IDENTITY_TIMEOUT_SECS",
        "ARTICLES_ALLOW_FIXTURE_IDENTITY",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> ArticlesSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        ArticlesSettings::load_from_iter([OsString::from("articles-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(settings.database_url().is_none());
        assert!(settings.seed_file().is_none());
        assert_eq!(settings.identity_timeout(), Duration::from_secs(10));
        assert_eq!(
            settings.jwks_url().expect("default url").as_str(),
            DEFAULT_JWKS_URL
        );
        assert!(!settings.allow_fixture_identity);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("ARTICLES_BIND_ADDR", "127.0.0.1:9000"),
            ("ARTICLES_DATABASE_URL", "postgres://localhost/articles"),
            ("ARTICLES_SEED_FILE", "/tmp/articles.json"),
            ("ARTICLES_IDENTITY_TIMEOUT_SECS", "3"),
            ("ARTICLES_ALLOW_FIXTURE_IDENTITY", "true"),
        ]);
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000");
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/articles")
        );
        assert_eq!(settings.seed_file(), Some(Path::new("/tmp/articles.json")));
        assert_eq!(settings.identity_timeout(), Duration::from_secs(3));
        assert!(settings.allow_fixture_identity);
    }

    #[rstest]
    #[case(false, false, Ok(IdentityBackend::Fixture))]
    #[case(true, true, Ok(IdentityBackend::Fixture))]
    #[case(true, false, Err(SettingsError::MissingProjectId))]
    fn missing_project_id_depends_on_build_strictness(
        #[case] strict: bool,
        #[case] allow_fixture: bool,
        #[case] expected: Result<IdentityBackend, SettingsError>,
    ) {
        let settings = ArticlesSettings {
            bind_addr: None,
            database_url: None,
            seed_file: None,
            firebase_project_id: None,
            jwks_url: None,
            identity_timeout_secs: None,
            allow_fixture_identity: allow_fixture,
        };
        assert_eq!(settings.identity_backend(strict), expected);
    }

    #[rstest]
    fn project_id_selects_firebase() {
        let settings = load_with(&[("ARTICLES_FIREBASE_PROJECT_ID", "demo-project")]);
        match settings.identity_backend(true).expect("backend") {
            IdentityBackend::Firebase {
                project_id,
                jwks_url,
                timeout,
            } => {
                assert_eq!(project_id, "demo-project");
                assert_eq!(jwks_url.as_str(), DEFAULT_JWKS_URL);
                assert_eq!(timeout, Duration::from_secs(10));
            }
            IdentityBackend::Fixture => panic!("expected firebase backend"),
        }
    }

    #[rstest]
    fn malformed_jwks_url_is_reported() {
        let settings = load_with(&[
            ("ARTICLES_FIREBASE_PROJECT_ID", "demo-project"),
            ("ARTICLES_JWKS_URL", "not a url"),
        ]);
        assert!(matches!(
            settings.identity_backend(true),
            Err(SettingsError::InvalidJwksUrl { .. })
        ));
    }
}

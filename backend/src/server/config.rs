//! HTTP server configuration object and helpers.

use std::path::PathBuf;

use articles_backend::outbound::persistence::DbPool;
use articles_backend::settings::IdentityBackend;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) identity: IdentityBackend,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) seed_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Construct a server configuration for `bind_addr` using `identity`.
    #[must_use]
    pub fn new(bind_addr: impl Into<String>, identity: IdentityBackend) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            identity,
            db_pool: None,
            seed_file: None,
        }
    }

    /// Attach a database connection pool; articles are then stored in
    /// PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: Option<DbPool>) -> Self {
        self.db_pool = pool;
        self
    }

    /// Seed the in-memory store from this file when no pool is attached.
    #[must_use]
    pub fn with_seed_file(mut self, seed_file: Option<PathBuf>) -> Self {
        self.seed_file = seed_file;
        self
    }
}

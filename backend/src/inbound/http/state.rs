//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ArticlesCommand, ArticlesQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Read-side article use-cases.
    pub articles: Arc<dyn ArticlesQuery>,
    /// Write-side article use-cases.
    pub article_commands: Arc<dyn ArticlesCommand>,
}

impl HttpState {
    /// Bundle the article ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use articles_backend::domain::ArticleService;
    /// use articles_backend::inbound::http::state::HttpState;
    /// use articles_backend::outbound::memory::InMemoryArticleRepository;
    ///
    /// let service = Arc::new(ArticleService::new(Arc::new(InMemoryArticleRepository::new())));
    /// let _state = HttpState::new(service.clone(), service);
    /// ```
    pub fn new(articles: Arc<dyn ArticlesQuery>, article_commands: Arc<dyn ArticlesCommand>) -> Self {
        Self {
            articles,
            article_commands,
        }
    }
}

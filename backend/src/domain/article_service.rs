//! Article use-cases: fetch, upvote, and comment.
//!
//! Each operation makes at most two store round-trips besides the write and
//! always answers with a freshly read document, so `canUpvote` reflects what
//! the store holds after the request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, ArticlesCommand, ArticlesQuery, UpvoteOutcome,
};
use crate::domain::{Article, ArticleName, ArticleView, Comment, Error, Identity};

/// Message returned when no article matches the requested name.
pub const ARTICLE_NOT_FOUND_MESSAGE: &str = "Article not found";

/// Article service implementing the driving ports over an article store.
#[derive(Clone)]
pub struct ArticleService<R> {
    repository: Arc<R>,
}

impl<R> ArticleService<R> {
    /// Create a service over the given store.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> ArticleService<R>
where
    R: ArticleRepository,
{
    fn map_repository_error(error: ArticleRepositoryError) -> Error {
        error!(%error, "article store failure");
        match error {
            ArticleRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("article store unavailable: {message}"))
            }
            ArticleRepositoryError::Query { message } => {
                Error::internal(format!("article store error: {message}"))
            }
        }
    }

    fn not_found(name: &ArticleName) -> Error {
        debug!(article = %name, "article not found");
        Error::not_found(ARTICLE_NOT_FOUND_MESSAGE)
    }

    async fn load(&self, name: &ArticleName) -> Result<Option<Article>, Error> {
        self.repository
            .find_by_name(name)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn load_existing(&self, name: &ArticleName) -> Result<Article, Error> {
        self.load(name).await?.ok_or_else(|| Self::not_found(name))
    }
}

#[async_trait]
impl<R> ArticlesQuery for ArticleService<R>
where
    R: ArticleRepository,
{
    async fn fetch_article(
        &self,
        name: &ArticleName,
        viewer: Option<&Identity>,
    ) -> Result<ArticleView, Error> {
        let article = self.load_existing(name).await?;
        Ok(ArticleView::for_viewer(article, viewer))
    }

    async fn check_store(&self) -> Result<(), Error> {
        self.repository
            .ping()
            .await
            .map_err(Self::map_repository_error)
    }
}

#[async_trait]
impl<R> ArticlesCommand for ArticleService<R>
where
    R: ArticleRepository,
{
    async fn upvote_article(
        &self,
        name: &ArticleName,
        identity: &Identity,
    ) -> Result<ArticleView, Error> {
        let article = self.load_existing(name).await?;

        if article.can_upvote(Some(identity)) {
            let outcome = self
                .repository
                .record_upvote(name, identity.subject())
                .await
                .map_err(Self::map_repository_error)?;
            if outcome == UpvoteOutcome::Skipped {
                // A concurrent request from the same subject won the write.
                debug!(article = %name, subject = %identity.subject(), "upvote already recorded");
            }
        }

        let refreshed = self.load_existing(name).await?;
        Ok(ArticleView::for_viewer(refreshed, Some(identity)))
    }

    async fn add_comment(
        &self,
        name: &ArticleName,
        identity: &Identity,
        text: String,
    ) -> Result<ArticleView, Error> {
        let comment = Comment::by(identity, text);
        self.repository
            .append_comment(name, &comment)
            .await
            .map_err(Self::map_repository_error)?;

        let article = self.load_existing(name).await?;
        Ok(ArticleView::for_viewer(article, Some(identity)))
    }
}

#[cfg(test)]
#[path = "article_service_tests.rs"]
mod tests;

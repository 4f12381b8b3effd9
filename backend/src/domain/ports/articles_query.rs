//! Driving port for article reads.

use async_trait::async_trait;

use crate::domain::{ArticleName, ArticleView, Error, Identity};

/// Use-case port for fetching an article as seen by a viewer.
#[async_trait]
pub trait ArticlesQuery: Send + Sync {
    /// Return the article and whether `viewer` may upvote it.
    ///
    /// Fails with `not_found` when no article has this name.
    async fn fetch_article(
        &self,
        name: &ArticleName,
        viewer: Option<&Identity>,
    ) -> Result<ArticleView, Error>;

    /// Report whether the article store is reachable.
    ///
    /// Fails with `service_unavailable` when the store cannot be reached.
    async fn check_store(&self) -> Result<(), Error>;
}

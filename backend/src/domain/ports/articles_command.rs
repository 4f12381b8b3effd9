//! Driving port for article mutations made by authenticated callers.

use async_trait::async_trait;

use crate::domain::{ArticleName, ArticleView, Error, Identity};

/// Use-case port for upvoting and commenting.
#[async_trait]
pub trait ArticlesCommand: Send + Sync {
    /// Count one upvote for `identity`; repeated calls are no-ops.
    async fn upvote_article(
        &self,
        name: &ArticleName,
        identity: &Identity,
    ) -> Result<ArticleView, Error>;

    /// Append a comment attributed to `identity` and return the refreshed
    /// article.
    async fn add_comment(
        &self,
        name: &ArticleName,
        identity: &Identity,
        text: String,
    ) -> Result<ArticleView, Error>;
}

//! Driven port for article document storage.
//!
//! The store is keyed by [`ArticleName`]. Articles are created out of band, so
//! the port offers reads plus the two single-document mutations the API
//! needs. Both mutations must be atomic per document.

use async_trait::async_trait;

use crate::domain::{Article, ArticleName, Comment, SubjectId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by article store adapters.
    pub enum ArticleRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "article store connection failed: {message}",
        /// A read or write failed while executing.
        Query { message: String } =>
            "article store query failed: {message}",
    }
}

/// Result of a conditional upvote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpvoteOutcome {
    /// The counter was incremented and the subject recorded.
    Recorded,
    /// Nothing changed: the subject had already voted or the article is gone.
    Skipped,
}

/// Port for reading and mutating article documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Load an article by name.
    async fn find_by_name(
        &self,
        name: &ArticleName,
    ) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Atomically increment `upvotes` and record `subject`, but only when the
    /// subject is not already recorded.
    async fn record_upvote(
        &self,
        name: &ArticleName,
        subject: &SubjectId,
    ) -> Result<UpvoteOutcome, ArticleRepositoryError>;

    /// Append `comment` to the article's thread. Succeeds without effect when
    /// no article matches.
    async fn append_comment(
        &self,
        name: &ArticleName,
        comment: &Comment,
    ) -> Result<(), ArticleRepositoryError>;

    /// Confirm the store can currently serve requests.
    async fn ping(&self) -> Result<(), ArticleRepositoryError>;
}

/// Store stand-in that holds no articles and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureArticleRepository;

#[async_trait]
impl ArticleRepository for FixtureArticleRepository {
    async fn find_by_name(
        &self,
        _name: &ArticleName,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(None)
    }

    async fn record_upvote(
        &self,
        _name: &ArticleName,
        _subject: &SubjectId,
    ) -> Result<UpvoteOutcome, ArticleRepositoryError> {
        Ok(UpvoteOutcome::Skipped)
    }

    async fn append_comment(
        &self,
        _name: &ArticleName,
        _comment: &Comment,
    ) -> Result<(), ArticleRepositoryError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), ArticleRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_repository_is_empty() {
        let repo = FixtureArticleRepository;
        let name = ArticleName::new("a").expect("name");
        let subject = SubjectId::new("u1").expect("subject");

        assert_eq!(repo.find_by_name(&name).await, Ok(None));
        assert_eq!(
            repo.record_upvote(&name, &subject).await,
            Ok(UpvoteOutcome::Skipped)
        );
        assert_eq!(repo.ping().await, Ok(()));
    }

    #[rstest]
    fn error_messages_name_the_store() {
        let err = ArticleRepositoryError::connection("refused");
        assert_eq!(err.to_string(), "article store connection failed: refused");
    }
}

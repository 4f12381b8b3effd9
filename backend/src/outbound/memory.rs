//! In-process article store.
//!
//! Used when no database is configured and as the store behind HTTP and
//! service tests. Each mutation holds the lock for one synchronous update, so
//! the conditional upvote is atomic exactly like the SQL adapter's single
//! statement.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError, UpvoteOutcome};
use crate::domain::{Article, ArticleName, Comment, SubjectId};

/// Errors raised while loading seed documents.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read article seed file {path}: {source}")]
    Read {
        /// Seed file location.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The seed file is not a JSON array of article documents.
    #[error("invalid article seed file {path}: {source}")]
    Parse {
        /// Seed file location.
        path: String,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Article store kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryArticleRepository {
    articles: Mutex<HashMap<ArticleName, Article>>,
}

impl InMemoryArticleRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `articles`; later duplicates replace earlier
    /// ones.
    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let articles = articles
            .into_iter()
            .map(|article| (article.name().clone(), article))
            .collect();
        Self {
            articles: Mutex::new(articles),
        }
    }

    /// Load a store from a JSON array of article documents, e.g.
    /// `[{"name": "learn-rust"}, {"name": "learn-sql", "comments": []}]`.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let seed_path = path.display().to_string();
        let raw = std::fs::read(path).map_err(|source| SeedError::Read {
            path: seed_path.clone(),
            source,
        })?;
        let articles: Vec<Article> =
            serde_json::from_slice(&raw).map_err(|source| SeedError::Parse {
                path: seed_path.clone(),
                source,
            })?;
        info!(path = %seed_path, count = articles.len(), "seeded in-memory article store");
        Ok(Self::with_articles(articles))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ArticleName, Article>>, ArticleRepositoryError> {
        self.articles
            .lock()
            .map_err(|_| ArticleRepositoryError::query("in-memory article store lock poisoned"))
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_by_name(
        &self,
        name: &ArticleName,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(self.lock()?.get(name).cloned())
    }

    async fn record_upvote(
        &self,
        name: &ArticleName,
        subject: &SubjectId,
    ) -> Result<UpvoteOutcome, ArticleRepositoryError> {
        let mut articles = self.lock()?;
        let recorded = articles
            .get_mut(name)
            .is_some_and(|article| article.record_upvote(subject));
        Ok(if recorded {
            UpvoteOutcome::Recorded
        } else {
            UpvoteOutcome::Skipped
        })
    }

    async fn append_comment(
        &self,
        name: &ArticleName,
        comment: &Comment,
    ) -> Result<(), ArticleRepositoryError> {
        if let Some(article) = self.lock()?.get_mut(name) {
            article.append_comment(comment.clone());
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), ArticleRepositoryError> {
        self.lock().map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn name(raw: &str) -> ArticleName {
        ArticleName::new(raw).expect("fixture name")
    }

    #[rstest]
    #[tokio::test]
    async fn conditional_upvote_records_each_subject_once() {
        let repo = InMemoryArticleRepository::with_articles([Article::new(name("a"))]);
        let subject = SubjectId::new("u1").expect("subject");

        assert_eq!(
            repo.record_upvote(&name("a"), &subject).await,
            Ok(UpvoteOutcome::Recorded)
        );
        assert_eq!(
            repo.record_upvote(&name("a"), &subject).await,
            Ok(UpvoteOutcome::Skipped)
        );
        let stored = repo
            .find_by_name(&name("a"))
            .await
            .expect("read")
            .expect("article present");
        assert_eq!(stored.upvotes(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn writes_to_missing_articles_are_ignored() {
        let repo = InMemoryArticleRepository::new();
        let subject = SubjectId::new("u1").expect("subject");

        assert_eq!(
            repo.record_upvote(&name("ghost"), &subject).await,
            Ok(UpvoteOutcome::Skipped)
        );
        repo.append_comment(&name("ghost"), &Comment::from_parts(None, "hi"))
            .await
            .expect("append succeeds");
        assert_eq!(repo.find_by_name(&name("ghost")).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn seed_file_populates_store() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"name": "learn-rust"}}, {{"name": "learn-sql", "upvotes": 1, "upvotedIds": ["u9"]}}]"#
        )
        .expect("write seed");

        let repo = InMemoryArticleRepository::from_seed_file(file.path()).expect("seed loads");
        let sql = repo
            .find_by_name(&name("learn-sql"))
            .await
            .expect("read")
            .expect("seeded");
        assert_eq!(sql.upvotes(), 1);
        assert!(repo
            .find_by_name(&name("learn-rust"))
            .await
            .expect("read")
            .is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn poisoned_lock_fails_the_ping() {
        let repo = std::sync::Arc::new(InMemoryArticleRepository::new());
        assert_eq!(repo.ping().await, Ok(()));

        let poisoner = std::sync::Arc::clone(&repo);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.articles.lock().expect("first lock");
            panic!("poison the store");
        })
        .join();
        assert!(joined.is_err());

        assert!(matches!(
            repo.ping().await,
            Err(ArticleRepositoryError::Query { .. })
        ));
    }

    #[rstest]
    fn malformed_seed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"name": "not-an-array"}}"#).expect("write seed");

        let result = InMemoryArticleRepository::from_seed_file(file.path());
        assert!(matches!(result, Err(SeedError::Parse { .. })));
    }
}

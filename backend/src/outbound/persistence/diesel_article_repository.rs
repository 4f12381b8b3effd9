//! PostgreSQL-backed `ArticleRepository` using Diesel.
//!
//! Reads go through the typed query builder; the two mutations are single
//! `UPDATE` statements so each is atomic on its row. The upvote statement
//! carries its own membership guard, which closes the read-check-write race
//! between concurrent upvotes from one subject.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Jsonb, Text};
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use super::models::ArticleRow;
use super::pool::{DbPool, PoolError};
use super::schema::articles;
use crate::domain::ports::{ArticleRepository, ArticleRepositoryError, UpvoteOutcome};
use crate::domain::{Article, ArticleName, Comment, SubjectId};

const RECORD_UPVOTE_SQL: &str = r#"
UPDATE articles
SET upvotes = upvotes + 1,
    upvoted_ids = array_append(upvoted_ids, $2)
WHERE name = $1
  AND NOT ($2 = ANY(upvoted_ids))
"#;

const APPEND_COMMENT_SQL: &str = r#"
UPDATE articles
SET comments = comments || jsonb_build_array($2)
WHERE name = $1
"#;

/// Diesel-backed article store.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    ArticleRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> ArticleRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ArticleRepositoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => ArticleRepositoryError::query("database query error"),
        _ => ArticleRepositoryError::query("database error"),
    }
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn find_by_name(
        &self,
        name: &ArticleName,
    ) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ArticleRow> = articles::table
            .filter(articles::name.eq(name.as_ref()))
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Article::try_from)
            .transpose()
            .map_err(|message| {
                warn!(article = %name, %message, "stored article violates invariants");
                ArticleRepositoryError::query(message)
            })
    }

    async fn record_upvote(
        &self,
        name: &ArticleName,
        subject: &SubjectId,
    ) -> Result<UpvoteOutcome, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = sql_query(RECORD_UPVOTE_SQL)
            .bind::<Text, _>(name.as_ref())
            .bind::<Text, _>(subject.as_ref())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(if updated == 0 {
            UpvoteOutcome::Skipped
        } else {
            UpvoteOutcome::Recorded
        })
    }

    async fn append_comment(
        &self,
        name: &ArticleName,
        comment: &Comment,
    ) -> Result<(), ArticleRepositoryError> {
        let document = serde_json::to_value(comment).map_err(|err| {
            ArticleRepositoryError::query(format!("failed to serialise comment: {err}"))
        })?;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = sql_query(APPEND_COMMENT_SQL)
            .bind::<Text, _>(name.as_ref())
            .bind::<Jsonb, _>(&document)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            debug!(article = %name, "comment targeted a missing article");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let mapped = map_pool_error(PoolError::Checkout {
            message: "timed out".to_owned(),
        });
        assert_eq!(mapped, ArticleRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            ArticleRepositoryError::Connection { .. }
        ));
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        assert!(matches!(
            map_diesel_error(DieselError::RollbackTransaction),
            ArticleRepositoryError::Query { .. }
        ));
    }

    #[rstest]
    fn upvote_statement_guards_membership() {
        assert!(RECORD_UPVOTE_SQL.contains("NOT ($2 = ANY(upvoted_ids))"));
    }
}

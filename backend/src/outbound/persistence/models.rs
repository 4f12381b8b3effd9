//! Diesel row types for the article table.
//!
//! Rows stay internal to the persistence adapter; conversion into domain
//! types re-checks the article invariants.

use diesel::prelude::*;

use super::schema::articles;
use crate::domain::{Article, ArticleName, Comment, SubjectId};

/// Queryable article row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub name: String,
    pub upvotes: i64,
    pub upvoted_ids: Vec<String>,
    pub comments: serde_json::Value,
}

impl TryFrom<ArticleRow> for Article {
    type Error = String;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let ArticleRow {
            name,
            upvotes,
            upvoted_ids,
            comments,
        } = row;
        let name = ArticleName::new(name).map_err(|err| err.to_string())?;
        let upvotes = u64::try_from(upvotes)
            .map_err(|_| format!("article {name} has a negative upvote count"))?;
        let upvoted_ids = upvoted_ids
            .into_iter()
            .map(SubjectId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| format!("article {name}: {err}"))?;
        let comments: Vec<Comment> = serde_json::from_value(comments)
            .map_err(|err| format!("article {name} has malformed comments: {err}"))?;
        Article::try_from_parts(name, upvotes, upvoted_ids, comments).map_err(|err| err.to_string())
    }
}

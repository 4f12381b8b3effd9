//! Article aggregate: upvote bookkeeping and the append-only comment thread.
//!
//! ## Invariants
//! - `upvotes` equals the number of entries in `upvoted_ids`.
//! - A subject appears at most once in `upvoted_ids`.
//! - Comments are only ever appended; order is insertion order.
//!
//! Serialisation uses camelCase (`upvotedIds`, `postedBy`) and validates the
//! invariants on the way in, so documents loaded from seed files or the store
//! cannot smuggle in a double count.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Identity, SubjectId};

/// Validation errors for article primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArticleValidationError {
    /// The article name was empty.
    #[error("article name must not be empty")]
    EmptyName,
    /// The upvote counter disagrees with the recorded voters.
    #[error("upvotes ({upvotes}) must equal the number of upvoted ids ({voters})")]
    UpvoteCountMismatch {
        /// Stored counter.
        upvotes: u64,
        /// Number of recorded voters.
        voters: usize,
    },
    /// A voter was recorded more than once.
    #[error("subject {subject} upvoted more than once")]
    DuplicateVoter {
        /// Offending subject.
        subject: String,
    },
}

/// Unique, immutable article key used in URLs and the store.
///
/// # Examples
/// ```
/// use articles_backend::domain::ArticleName;
///
/// let name = ArticleName::new("learn-rust").expect("valid name");
/// assert_eq!(name.as_ref(), "learn-rust");
/// assert!(ArticleName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArticleName(String);

impl ArticleName {
    /// Validate and wrap an article name.
    pub fn new(name: impl Into<String>) -> Result<Self, ArticleValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ArticleValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for ArticleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ArticleName {
    type Error = ArticleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArticleName> for String {
    fn from(value: ArticleName) -> Self {
        value.0
    }
}

/// One entry in an article's comment thread.
///
/// `posted_by` is the commenter's email claim; identities without an email
/// produce `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    posted_by: Option<String>,
    text: String,
}

impl Comment {
    /// Attribute `text` to the given identity.
    pub fn by(identity: &Identity, text: impl Into<String>) -> Self {
        Self {
            posted_by: identity.email().map(str::to_owned),
            text: text.into(),
        }
    }

    /// Build a comment from stored parts.
    pub fn from_parts(posted_by: Option<String>, text: impl Into<String>) -> Self {
        Self {
            posted_by,
            text: text.into(),
        }
    }

    /// Email of the commenter, if known.
    pub fn posted_by(&self) -> Option<&str> {
        self.posted_by.as_deref()
    }

    /// Comment body, verbatim.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Article document as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "ArticleDto")]
pub struct Article {
    name: ArticleName,
    upvotes: u64,
    upvoted_ids: Vec<SubjectId>,
    comments: Vec<Comment>,
}

impl Article {
    /// A fresh article with no votes and no comments.
    pub fn new(name: ArticleName) -> Self {
        Self {
            name,
            upvotes: 0,
            upvoted_ids: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Rebuild an article from stored parts, checking the upvote invariants.
    pub fn try_from_parts(
        name: ArticleName,
        upvotes: u64,
        upvoted_ids: Vec<SubjectId>,
        comments: Vec<Comment>,
    ) -> Result<Self, ArticleValidationError> {
        if upvotes != upvoted_ids.len() as u64 {
            return Err(ArticleValidationError::UpvoteCountMismatch {
                upvotes,
                voters: upvoted_ids.len(),
            });
        }
        let mut seen = std::collections::HashSet::with_capacity(upvoted_ids.len());
        if let Some(duplicate) = upvoted_ids.iter().find(|id| !seen.insert(*id)) {
            return Err(ArticleValidationError::DuplicateVoter {
                subject: duplicate.to_string(),
            });
        }
        Ok(Self {
            name,
            upvotes,
            upvoted_ids,
            comments,
        })
    }

    /// Article key.
    pub fn name(&self) -> &ArticleName {
        &self.name
    }

    /// Upvote counter.
    pub fn upvotes(&self) -> u64 {
        self.upvotes
    }

    /// Subjects that have upvoted, in the order they voted.
    pub fn upvoted_ids(&self) -> &[SubjectId] {
        &self.upvoted_ids
    }

    /// Comment thread in insertion order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Whether `subject` has already upvoted.
    pub fn has_upvoted(&self, subject: &SubjectId) -> bool {
        self.upvoted_ids.contains(subject)
    }

    /// `true` when a verified viewer is present and has not yet upvoted.
    pub fn can_upvote(&self, viewer: Option<&Identity>) -> bool {
        viewer.is_some_and(|identity| !self.has_upvoted(identity.subject()))
    }

    /// Count an upvote for `subject` unless it was already counted.
    ///
    /// Returns whether the article changed.
    pub fn record_upvote(&mut self, subject: &SubjectId) -> bool {
        if self.has_upvoted(subject) {
            return false;
        }
        self.upvoted_ids.push(subject.clone());
        self.upvotes += 1;
        true
    }

    /// Append a comment to the end of the thread.
    pub fn append_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleDto {
    name: ArticleName,
    #[serde(default)]
    upvotes: u64,
    #[serde(default)]
    upvoted_ids: Vec<SubjectId>,
    #[serde(default)]
    comments: Vec<Comment>,
}

impl TryFrom<ArticleDto> for Article {
    type Error = ArticleValidationError;

    fn try_from(value: ArticleDto) -> Result<Self, Self::Error> {
        let ArticleDto {
            name,
            upvotes,
            upvoted_ids,
            comments,
        } = value;
        Self::try_from_parts(name, upvotes, upvoted_ids, comments)
    }
}

/// An article as seen by one viewer: the document plus `canUpvote`.
///
/// Serialises flat, e.g.
/// `{"name":"a","upvotes":1,"upvotedIds":["u1"],"comments":[],"canUpvote":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    #[serde(flatten)]
    article: Article,
    can_upvote: bool,
}

impl ArticleView {
    /// Derive the view of `article` for `viewer`.
    pub fn for_viewer(article: Article, viewer: Option<&Identity>) -> Self {
        let can_upvote = article.can_upvote(viewer);
        Self {
            article,
            can_upvote,
        }
    }

    /// Underlying document.
    pub fn article(&self) -> &Article {
        &self.article
    }

    /// Whether the viewer may upvote.
    pub fn can_upvote(&self) -> bool {
        self.can_upvote
    }
}

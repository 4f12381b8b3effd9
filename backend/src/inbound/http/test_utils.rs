//! Test helpers for inbound HTTP components.

use crate::domain::{Article, ArticleName, Identity, SubjectId};

/// A stored article with no votes or comments.
pub fn stored_article(name: &str) -> Article {
    Article::new(ArticleName::new(name).expect("fixture article name"))
}

/// A verified identity with the given subject and email.
pub fn verified_identity(subject: &str, email: Option<&str>) -> Identity {
    Identity::new(
        SubjectId::new(subject).expect("fixture subject"),
        email.map(str::to_owned),
    )
}

//! Tests for the article service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{FixtureArticleRepository, MockArticleRepository};
use crate::domain::{ErrorCode, SubjectId};
use crate::outbound::memory::InMemoryArticleRepository;
use rstest::{fixture, rstest};

fn name(raw: &str) -> ArticleName {
    ArticleName::new(raw).expect("fixture name")
}

fn identity(subject: &str, email: &str) -> Identity {
    Identity::new(
        SubjectId::new(subject).expect("fixture subject"),
        Some(email.to_owned()),
    )
}

#[fixture]
fn u1() -> Identity {
    identity("u1", "e@x.com")
}

#[fixture]
fn service() -> ArticleService<InMemoryArticleRepository> {
    let repo = InMemoryArticleRepository::with_articles([Article::new(name("a"))]);
    ArticleService::new(Arc::new(repo))
}

#[rstest]
#[tokio::test]
async fn fetch_reports_can_upvote_for_new_voter(
    service: ArticleService<InMemoryArticleRepository>,
    u1: Identity,
) {
    let view = service
        .fetch_article(&name("a"), Some(&u1))
        .await
        .expect("article exists");
    assert!(view.can_upvote());
    assert_eq!(view.article().upvotes(), 0);
}

#[rstest]
#[tokio::test]
async fn fetch_as_anonymous_cannot_upvote(service: ArticleService<InMemoryArticleRepository>) {
    let view = service
        .fetch_article(&name("a"), None)
        .await
        .expect("article exists");
    assert!(!view.can_upvote());
}

#[rstest]
#[case(None)]
#[case(Some(identity("u1", "e@x.com")))]
#[tokio::test]
async fn fetch_missing_article_is_not_found(#[case] viewer: Option<Identity>) {
    let service = ArticleService::new(Arc::new(FixtureArticleRepository));
    let err = service
        .fetch_article(&name("missing"), viewer.as_ref())
        .await
        .expect_err("nothing stored");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), ARTICLE_NOT_FOUND_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn upvote_counts_once_then_is_idempotent(
    service: ArticleService<InMemoryArticleRepository>,
    u1: Identity,
) {
    let first = service
        .upvote_article(&name("a"), &u1)
        .await
        .expect("first upvote");
    assert_eq!(first.article().upvotes(), 1);
    assert_eq!(
        first.article().upvoted_ids(),
        &[SubjectId::new("u1").expect("subject")]
    );
    assert!(!first.can_upvote());

    let second = service
        .upvote_article(&name("a"), &u1)
        .await
        .expect("second upvote");
    assert_eq!(second, first);
}

#[rstest]
#[tokio::test]
async fn upvotes_from_different_subjects_accumulate(
    service: ArticleService<InMemoryArticleRepository>,
    u1: Identity,
) {
    service
        .upvote_article(&name("a"), &u1)
        .await
        .expect("u1 upvote");
    let view = service
        .upvote_article(&name("a"), &identity("u2", "f@x.com"))
        .await
        .expect("u2 upvote");
    assert_eq!(view.article().upvotes(), 2);
    assert_eq!(view.article().upvoted_ids().len(), 2);
}

#[rstest]
#[tokio::test]
async fn upvote_skips_write_when_already_voted(u1: Identity) {
    let mut voted = Article::new(name("a"));
    voted.record_upvote(u1.subject());

    let mut repo = MockArticleRepository::new();
    repo.expect_find_by_name()
        .times(2)
        .returning(move |_| Ok(Some(voted.clone())));
    repo.expect_record_upvote().never();

    let service = ArticleService::new(Arc::new(repo));
    let view = service
        .upvote_article(&name("a"), &u1)
        .await
        .expect("no-op upvote succeeds");
    assert_eq!(view.article().upvotes(), 1);
    assert!(!view.can_upvote());
}

#[rstest]
#[tokio::test]
async fn upvote_missing_article_is_not_found_without_writing(u1: Identity) {
    let mut repo = MockArticleRepository::new();
    repo.expect_find_by_name().times(1).returning(|_| Ok(None));
    repo.expect_record_upvote().never();

    let service = ArticleService::new(Arc::new(repo));
    let err = service
        .upvote_article(&name("missing"), &u1)
        .await
        .expect_err("missing article");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn comment_is_appended_with_email_attribution(
    service: ArticleService<InMemoryArticleRepository>,
    u1: Identity,
) {
    let view = service
        .add_comment(&name("a"), &u1, "hi".to_owned())
        .await
        .expect("comment stored");
    assert_eq!(
        view.article().comments(),
        &[Comment::from_parts(Some("e@x.com".to_owned()), "hi")]
    );
    assert!(view.can_upvote());
}

#[rstest]
#[tokio::test]
async fn comments_append_after_existing_ones(
    service: ArticleService<InMemoryArticleRepository>,
    u1: Identity,
) {
    for text in ["one", "two", ""] {
        service
            .add_comment(&name("a"), &u1, text.to_owned())
            .await
            .expect("comment stored");
    }
    let view = service
        .fetch_article(&name("a"), None)
        .await
        .expect("article exists");
    let texts: Vec<_> = view.article().comments().iter().map(Comment::text).collect();
    assert_eq!(texts, ["one", "two", ""]);
}

#[rstest]
#[tokio::test]
async fn comment_on_missing_article_writes_then_reports_not_found(u1: Identity) {
    let mut repo = MockArticleRepository::new();
    repo.expect_append_comment().times(1).returning(|_, _| Ok(()));
    repo.expect_find_by_name().times(1).returning(|_| Ok(None));

    let service = ArticleService::new(Arc::new(repo));
    let err = service
        .add_comment(&name("missing"), &u1, "hi".to_owned())
        .await
        .expect_err("missing article");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(
    ArticleRepositoryError::connection("refused"),
    ErrorCode::ServiceUnavailable
)]
#[case(ArticleRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_map_to_domain_errors(
    #[case] failure: ArticleRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockArticleRepository::new();
    repo.expect_find_by_name()
        .times(1)
        .return_once(move |_| Err(failure));

    let service = ArticleService::new(Arc::new(repo));
    let err = service
        .fetch_article(&name("a"), None)
        .await
        .expect_err("store failure");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn store_check_passes_through_a_healthy_store(
    service: ArticleService<InMemoryArticleRepository>,
) {
    assert!(service.check_store().await.is_ok());
}

#[rstest]
#[tokio::test]
async fn unreachable_store_fails_the_check() {
    let mut repo = MockArticleRepository::new();
    repo.expect_ping()
        .times(1)
        .returning(|| Err(ArticleRepositoryError::connection("refused")));

    let service = ArticleService::new(Arc::new(repo));
    let err = service.check_store().await.expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

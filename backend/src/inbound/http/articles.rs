//! Article API handlers.
//!
//! ```text
//! GET  /api/articles/{name}
//! PUT  /api/articles/{name}/upvote          (authtoken required)
//! POST /api/articles/{name}/comments {"text":"Great read!"}  (authtoken required)
//! ```
//!
//! Every successful response is the article document plus `canUpvote` for
//! the caller.

use actix_web::{get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{ArticleName, ArticleView, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::{Authenticated, MaybeIdentity};
use crate::inbound::http::schemas::{ArticleViewSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/articles/{name}/comments`.
///
/// Example JSON: `{"text":"Great read!"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AddCommentRequest {
    /// Comment body; stored verbatim, empty strings included.
    pub text: String,
}

fn parse_article_name(raw: String) -> Result<ArticleName, Error> {
    ArticleName::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "name" }))
    })
}

/// Fetch an article and whether the caller may upvote it.
///
/// Anonymous callers are welcome; `canUpvote` is then always `false`.
#[utoipa::path(
    get,
    path = "/api/articles/{name}",
    params(("name" = String, Path, description = "Article name")),
    responses(
        (status = 200, description = "Article", body = ArticleViewSchema),
        (status = 401, description = "Invalid authentication token", body = ErrorSchema),
        (status = 404, description = "Article not found", body = ErrorSchema),
        (status = 503, description = "Article store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "getArticle",
    security([], ("AuthToken" = []))
)]
#[get("/articles/{name}")]
pub async fn get_article(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    MaybeIdentity(viewer): MaybeIdentity,
) -> ApiResult<web::Json<ArticleView>> {
    let name = parse_article_name(path.into_inner())?;
    let view = state.articles.fetch_article(&name, viewer.as_ref()).await?;
    Ok(web::Json(view))
}

/// Upvote an article once per identity.
///
/// Repeat upvotes succeed without changing the count.
#[utoipa::path(
    put,
    path = "/api/articles/{name}/upvote",
    params(("name" = String, Path, description = "Article name")),
    responses(
        (status = 200, description = "Article after the upvote", body = ArticleViewSchema),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorSchema),
        (status = 404, description = "Article not found", body = ErrorSchema),
        (status = 503, description = "Article store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "upvoteArticle",
    security(("AuthToken" = []))
)]
#[put("/articles/{name}/upvote")]
pub async fn upvote_article(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    Authenticated(identity): Authenticated,
) -> ApiResult<web::Json<ArticleView>> {
    let name = parse_article_name(path.into_inner())?;
    let view = state
        .article_commands
        .upvote_article(&name, &identity)
        .await?;
    Ok(web::Json(view))
}

/// Append a comment attributed to the caller's email.
#[utoipa::path(
    post,
    path = "/api/articles/{name}/comments",
    params(("name" = String, Path, description = "Article name")),
    request_body = AddCommentRequest,
    responses(
        (status = 200, description = "Article including the new comment", body = ArticleViewSchema),
        (status = 400, description = "Invalid request body", body = ErrorSchema),
        (status = 401, description = "Missing or invalid authentication token", body = ErrorSchema),
        (status = 404, description = "Article not found", body = ErrorSchema),
        (status = 503, description = "Article store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["articles"],
    operation_id = "addComment",
    security(("AuthToken" = []))
)]
#[post("/articles/{name}/comments")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    Authenticated(identity): Authenticated,
    payload: web::Json<AddCommentRequest>,
) -> ApiResult<web::Json<ArticleView>> {
    let name = parse_article_name(path.into_inner())?;
    let AddCommentRequest { text } = payload.into_inner();
    let view = state
        .article_commands
        .add_comment(&name, &identity, text)
        .await?;
    Ok(web::Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    use crate::domain::ports::FixtureIdentityVerifier;
    use crate::domain::{ArticleService, ErrorCode};
    use crate::inbound::http::error::json_config;
    use crate::inbound::http::identity::IdentityGate;
    use crate::inbound::http::test_utils::stored_article;
    use crate::outbound::memory::InMemoryArticleRepository;

    #[rstest]
    fn empty_name_is_an_invalid_request() {
        let err = parse_article_name(String::new()).expect_err("invalid name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details(), Some(&json!({ "field": "name" })));
    }

    #[rstest]
    #[case(" padded")]
    #[case("padded ")]
    fn padded_names_are_kept_verbatim(#[case] raw: &str) {
        let name = parse_article_name(raw.to_owned()).expect("valid name");
        assert_eq!(name.as_ref(), raw);
    }

    #[rstest]
    #[actix_web::test]
    async fn whitespace_path_segment_misses_the_store() {
        let repo = Arc::new(InMemoryArticleRepository::with_articles([stored_article("a")]));
        let service = Arc::new(ArticleService::new(repo));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HttpState::new(service.clone(), service)))
                .app_data(json_config())
                .wrap(IdentityGate::new(Arc::new(FixtureIdentityVerifier::new())))
                .service(web::scope("/api").service(get_article)),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/api/articles/%20a")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "not_found");
    }
}

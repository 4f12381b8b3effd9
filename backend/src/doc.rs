//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: the article endpoints and the health probes.
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] plus the comment request body.
//! - **Security**: the `authtoken` header scheme.
//!
//! The generated document is used by Swagger UI (debug builds) and the
//! `openapi-dump` binary.

use crate::inbound::http::articles::AddCommentRequest;
use crate::inbound::http::schemas::{
    ArticleViewSchema, CommentSchema, ErrorCodeSchema, ErrorSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the `authtoken` security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AuthToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "authtoken",
                "ID token issued by the identity provider.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Articles backend API",
        description = "Article reads, upvotes and comments with token-based identity."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::articles::get_article,
        crate::inbound::http::articles::upvote_article,
        crate::inbound::http::articles::add_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ArticleViewSchema,
        CommentSchema,
        ErrorSchema,
        ErrorCodeSchema,
        AddCommentRequest
    )),
    tags(
        (name = "articles", description = "Article reads, upvotes and comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

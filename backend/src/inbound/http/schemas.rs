//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON produced by their domain counterparts
//! but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The article store or identity provider is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Article not found")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Comment`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Comment)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommentSchema {
    /// Email of the commenter; `null` when the identity carried none.
    #[schema(rename = "postedBy", example = "ada@example.com")]
    posted_by: Option<String>,
    /// Comment body, stored verbatim.
    #[schema(example = "Great read!")]
    text: String,
}

/// OpenAPI schema for [`crate::domain::ArticleView`].
///
/// The stored article document plus whether the caller may upvote it.
#[derive(ToSchema)]
#[schema(as = crate::domain::ArticleView)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ArticleViewSchema {
    /// Unique article key.
    #[schema(example = "learn-react")]
    name: String,
    /// Number of distinct upvoters.
    #[schema(example = 1)]
    upvotes: u64,
    /// Subjects that have upvoted, in voting order.
    #[schema(rename = "upvotedIds")]
    upvoted_ids: Vec<String>,
    /// Comment thread in insertion order.
    comments: Vec<CommentSchema>,
    /// `true` when the caller is authenticated and has not yet upvoted.
    #[schema(rename = "canUpvote")]
    can_upvote: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "not_found",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let schema_json = schema_to_json::<ErrorSchema>();
        assert!(schema_json.contains("traceId"));
        assert!(!schema_json.contains("trace_id"));
    }

    #[test]
    fn article_view_schema_matches_wire_names() {
        assert_eq!(ArticleViewSchema::name(), "crate.domain.ArticleView");
        let schema_json = schema_to_json::<ArticleViewSchema>();
        for field in ["name", "upvotes", "upvotedIds", "comments", "canUpvote"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }
}

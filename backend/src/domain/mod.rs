//! Domain primitives, ports, and use-cases.
//!
//! Purpose: keep article rules (who may upvote, how comments accumulate) and
//! the error vocabulary independent of HTTP and storage. Adapters depend on
//! this module, never the other way round.
//!
//! Public surface:
//! - `Article`, `ArticleName`, `ArticleView`, `Comment`: the article aggregate.
//! - `Identity`, `SubjectId`, `AuthToken`: verified callers and raw tokens.
//! - `Error`, `ErrorCode`: transport-agnostic failures.
//! - `ArticleService`: implementation of the driving ports.
//! - `TraceId`: request correlation identifier.

pub mod article;
pub mod article_service;
pub mod error;
pub mod identity;
pub mod ports;
pub mod trace_id;

pub use self::article::{Article, ArticleName, ArticleValidationError, ArticleView, Comment};
pub use self::article_service::{ARTICLE_NOT_FOUND_MESSAGE, ArticleService};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{AuthToken, Identity, IdentityValidationError, SubjectId};
pub use self::trace_id::TraceId;

/// HTTP header carrying the trace identifier on every response.
pub const TRACE_ID_HEADER: &str = "trace-id";

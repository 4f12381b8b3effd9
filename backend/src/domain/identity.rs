//! Verified caller identity.
//!
//! An [`Identity`] is only ever produced by an identity verifier adapter after
//! the bearer token has been checked. Anonymous callers are represented by the
//! absence of an identity (`Option<Identity>`), never by an empty value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest subject accepted from the identity provider, in bytes.
pub const SUBJECT_ID_MAX_LEN: usize = 128;

/// Validation errors for identity primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// The subject was empty or only whitespace.
    #[error("subject id must not be empty")]
    EmptySubject,
    /// The subject exceeded [`SUBJECT_ID_MAX_LEN`].
    #[error("subject id must be at most {max} bytes")]
    SubjectTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The bearer token was empty.
    #[error("authentication token must not be empty")]
    EmptyToken,
}

/// Stable identifier of an authenticated user, as issued by the provider.
///
/// # Examples
/// ```
/// use articles_backend::domain::SubjectId;
///
/// let id = SubjectId::new("u1").expect("valid subject");
/// assert_eq!(id.as_ref(), "u1");
/// assert!(SubjectId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Validate and wrap a provider subject.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityValidationError::EmptySubject);
        }
        if id.len() > SUBJECT_ID_MAX_LEN {
            return Err(IdentityValidationError::SubjectTooLong {
                max: SUBJECT_ID_MAX_LEN,
            });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubjectId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

/// A caller whose token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: SubjectId,
    email: Option<String>,
}

impl Identity {
    /// Build an identity from verified claims.
    pub fn new(subject: SubjectId, email: Option<String>) -> Self {
        Self { subject, email }
    }

    /// Provider subject used for upvote bookkeeping.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Email claim used to attribute comments, when the provider supplied one.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Opaque bearer token read from the `authtoken` header.
///
/// `Debug` output is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw header value.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentityValidationError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw token for verification.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

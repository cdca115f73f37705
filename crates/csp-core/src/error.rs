//! Error types for the CSP core
//!
//! Two layers live here:
//!
//! - [`Error`] is returned by the few public operations that can fail outside
//!   of parsing (building an origin, merging mismatched directives).
//! - [`DirectiveFailure`] and [`ValueFailure`] are the local failure signals
//!   used by the grammar rules. A rule that returns one of them has already
//!   recorded a notice explaining why; callers only use them to decide what
//!   gets dropped. They never escape [`crate::parser`].

use crate::directive::DirectiveKind;

/// CSP core error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The origin used to resolve relative references is not an absolute URL
    #[error("Invalid origin \"{origin}\": {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// Two directives of different kinds cannot be merged
    #[error("Cannot merge {right} directive into {left} directive")]
    MergeMismatch {
        left: DirectiveKind,
        right: DirectiveKind,
    },

    /// Output encoding failure (used by the bindings)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for CSP core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aborts the directive currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveFailure {
    #[error("Missing directive-name")]
    MissingDirectiveName,
    #[error("Invalid directive-name")]
    InvalidDirectiveName,
    #[error("Invalid directive-value")]
    InvalidDirectiveValue,
    #[error("Invalid media-type-list")]
    InvalidMediaTypeList,
    #[error("Invalid source-list")]
    InvalidSourceList,
    #[error("Invalid ancestor-source-list")]
    InvalidAncestorSourceList,
    #[error("Invalid referrer token")]
    InvalidReferrerToken,
    #[error("Invalid report-to token")]
    InvalidReportToToken,
    #[error("Invalid require-sri-for token list")]
    InvalidRequireSriForTokenList,
    #[error("Invalid sandbox token list")]
    InvalidSandboxTokenList,
    #[error("Invalid uri-reference list")]
    InvalidUriReferenceList,
    #[error("Non-empty directive-value list")]
    NonEmptyValueTokenList,
}

/// Aborts a single entry of a directive's value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValueFailure {
    #[error("Invalid media-type")]
    InvalidMediaType,
    #[error("Invalid source-expression")]
    InvalidSourceExpression,
    #[error("Invalid ancestor-source")]
    InvalidAncestorSource,
    #[error("Invalid require-sri-for token")]
    InvalidRequireSriForToken,
    #[error("Invalid sandbox token")]
    InvalidSandboxToken,
    #[error("Invalid uri-reference")]
    InvalidUriReference,
}

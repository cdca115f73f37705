//! CSP Core - Content-Security-Policy parser and validator
//!
//! Parses `Content-Security-Policy` header text into a typed [`Policy`]
//! model and reports every problem it finds as a [`Notice`]. Parsing never
//! fails: malformed directives and values are dropped, the rest is kept.
//!
//! # Architecture
//!
//! ```text
//! Header text → Tokenizer → Token stream → Parser → Policy
//!                                            ↓
//!                                      NoticeSink (errors, warnings, infos)
//! ```
//!
//! # Guarantees
//!
//! - **Total**: Every input produces a policy (possibly empty) and notices
//! - **Deterministic**: Same input always produces identical output
//! - **First wins**: Repeated directives and source expressions keep the
//!   first occurrence
//! - **Canonical**: Every policy displays as normalized CSP text
//!
//! # Example
//!
//! ```
//! let origin = csp_core::parse_origin("https://example.com").unwrap();
//! let parsed = csp_core::parse("script-src 'self' 'unsafe-inline' 'nonce-MTIzNDU2Nzg5MDEyMzQ1Ng=='", &origin);
//! assert!(parsed.is_valid());
//! assert_eq!(parsed.infos().len(), 1);
//! ```

pub mod directive;
pub mod error;
pub mod notice;
pub mod parser;
pub mod policy;
pub mod values;

pub use directive::DirectiveKind;
pub use error::{Error, Result};
pub use notice::{Notice, NoticeSink, Parsed, Severity, Silent};
pub use parser::{parse_policy, parse_policy_list};
pub use policy::{Directive, DirectiveValues, Policy};
pub use url::Url;

/// Parse the origin that relative references in a policy resolve against.
///
/// # Errors
/// Returns `InvalidOrigin` unless `origin` is an absolute URL.
pub fn parse_origin(origin: &str) -> Result<Url> {
    Url::parse(origin).map_err(|e| Error::InvalidOrigin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a single policy, collecting notices.
pub fn parse(text: &str, origin: &Url) -> Parsed<Policy> {
    let mut notices = Vec::new();
    let value = parse_policy(text, origin, &mut notices);
    tracing::debug!(notices = notices.len(), "parse complete");
    Parsed { value, notices }
}

/// Parse a comma-separated policy list, collecting notices.
pub fn parse_multi(text: &str, origin: &Url) -> Parsed<Vec<Policy>> {
    let mut notices = Vec::new();
    let value = parse_policy_list(text, origin, &mut notices);
    tracing::debug!(notices = notices.len(), "parse complete");
    Parsed { value, notices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        parse_origin("https://example.com").unwrap()
    }

    #[test]
    fn test_parse_origin_rejects_relative() {
        let err = parse_origin("/relative").unwrap_err();
        assert!(matches!(err, Error::InvalidOrigin { .. }));
        assert!(err.to_string().starts_with("Invalid origin \"/relative\""));
    }

    #[test]
    fn test_parse_collects_notices() {
        let parsed = parse("img-src a;;; img-src b; bogus x", &origin());
        assert!(!parsed.is_valid());
        assert_eq!(parsed.errors().len(), 1);
        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.value.len(), 1);
    }

    #[test]
    fn test_parse_multi() {
        let parsed = parse_multi("default-src 'none', script-src 'self'", &origin());
        assert!(parsed.is_valid());
        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value[1].to_string(), "script-src 'self'");
    }

    #[test]
    fn test_parsed_serializes() {
        let parsed = parse("img-src 'self' 'self'", &origin());
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["value"]["origin"], "https://example.com/");
        assert_eq!(json["notices"][0]["severity"], "warning");
        assert_eq!(json["notices"][0]["span"]["column"], 16);
    }
}

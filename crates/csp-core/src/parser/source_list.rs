//! Source-list and ancestor-source-list grammars
//!
//! Besides recognising each source expression, the source-list rule tracks
//! which kinds of expression it has already accepted, so that combinations
//! that silently disable one another can be reported.

use crate::error::{DirectiveFailure, ValueFailure};
use crate::values::*;

use super::patterns::{HOST_SOURCE, SCHEME_SOURCE, UNQUOTED_KEYWORD};
use super::tokenizer::{SpannedToken, Token};
use super::Parser;

const UNSAFE_INLINE_INEFFECTIVE: &str = concat!(
    "The \"'unsafe-inline'\" keyword-source has no effect in source lists that contain hash-source or nonce-source in CSP2 and later. ",
    "Ensure that this pattern is only used for backwards compatibility with older CSP implementations and is not an oversight.",
);

const STRICT_DYNAMIC_INEFFECTIVE: &str = concat!(
    "The host-source and scheme-source expressions, as well as the \"'unsafe-inline'\" and \"'self'\" keyword-sources have no effect in source lists that contain \"'strict-dynamic'\" in CSP3 and later. ",
    "Ensure that this pattern is only used for backwards compatibility with older CSP implementations and is not an oversight.",
);

const UNSAFE_HASHES_WITHOUT_HASH: &str = "The \"'unsafe-hashes'\" keyword-source has no effect in source lists that do not contain hash-source in CSP3 and later.";

// ── Seen-state flags ──────────────────────────────────────

/// Kinds of source expression already accepted in the current list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Seen(u16);

impl Seen {
    const NONE: Seen = Seen(1 << 0);
    const HOST_OR_SCHEME: Seen = Seen(1 << 1);
    const SELF: Seen = Seen(1 << 2);
    const STRICT_DYNAMIC: Seen = Seen(1 << 3);
    const UNSAFE_EVAL: Seen = Seen(1 << 4);
    const UNSAFE_INLINE: Seen = Seen(1 << 5);
    const UNSAFE_HASHES: Seen = Seen(1 << 6);
    const NONCE: Seen = Seen(1 << 7);
    const HASH: Seen = Seen(1 << 8);
    const REPORT_SAMPLE: Seen = Seen(1 << 9);
    const UNSAFE_ALLOW_REDIRECTS: Seen = Seen(1 << 10);

    fn of(expression: &SourceExpression) -> Seen {
        match expression {
            SourceExpression::None => Seen::NONE,
            SourceExpression::Scheme(_) | SourceExpression::Host(_) => Seen::HOST_OR_SCHEME,
            SourceExpression::Nonce(_) => Seen::NONCE,
            SourceExpression::Hash(_) => Seen::HASH,
            SourceExpression::Keyword(keyword) => match keyword {
                KeywordSource::SelfOrigin => Seen::SELF,
                KeywordSource::StrictDynamic => Seen::STRICT_DYNAMIC,
                KeywordSource::UnsafeEval => Seen::UNSAFE_EVAL,
                KeywordSource::UnsafeInline => Seen::UNSAFE_INLINE,
                KeywordSource::UnsafeHashes => Seen::UNSAFE_HASHES,
                KeywordSource::ReportSample => Seen::REPORT_SAMPLE,
                KeywordSource::UnsafeAllowRedirects => Seen::UNSAFE_ALLOW_REDIRECTS,
                KeywordSource::UnsafeRedirect => Seen::default(),
            },
        }
    }

    fn insert(&mut self, other: Seen) {
        self.0 |= other.0;
    }

    fn contains(self, other: Seen) -> bool {
        self.0 & other.0 != 0
    }

    fn contains_any(self, others: &[Seen]) -> bool {
        others.iter().any(|&other| self.contains(other))
    }
}

// ── Host sources ──────────────────────────────────────────

/// Match `[scheme://]host[:port][path]`. Ports that overflow do not match.
fn match_host_source(value: &str) -> Option<HostSource> {
    let captures = HOST_SOURCE.captures(value)?;
    let scheme = captures
        .name("scheme")
        .map(|m| m.as_str().trim_end_matches("://").to_string());
    let port = match captures.name("port").map(|m| &m.as_str()[1..]) {
        None => scheme
            .as_deref()
            .map_or(Port::Unspecified, Port::default_for_scheme),
        Some("*") => Port::Wildcard,
        Some(digits) => Port::Number(digits.parse().ok()?),
    };
    let host = captures.name("host")?.as_str();
    let path = captures.name("path").map(|m| m.as_str().to_string());
    Some(HostSource::new(scheme, host, port, path))
}

fn match_scheme_source(value: &str) -> Option<SchemeSource> {
    if SCHEME_SOURCE.is_match(value) {
        Some(SchemeSource::new(&value[..value.len() - 1]))
    } else {
        None
    }
}

/// Algorithm, then digest text, of a well-formed `'sha…-…'` token.
fn split_hash_token(value: &str) -> Option<(&str, &str)> {
    let well_formed = value.len() >= 9
        && value.ends_with('\'')
        && value.as_bytes().get(7) == Some(&b'-')
        && value
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("'sha"));
    if !well_formed {
        return None;
    }
    Some((value.get(4..7)?, value.get(8..value.len() - 1)?))
}

fn split_nonce_token(value: &str) -> Option<&str> {
    if value.len() >= 8 && value.starts_with("'nonce-") && value.ends_with('\'') {
        value.get(7..value.len() - 1)
    } else {
        None
    }
}

impl<'t, 's> Parser<'t, 's> {
    // ── Source lists ───────────────────────────────────────

    /// `name` is the directive-name token the list belongs to.
    pub(super) fn parse_source_list(
        &mut self,
        name: &SpannedToken,
    ) -> Result<Vec<SourceExpression>, DirectiveFailure> {
        let mut sources: Vec<SourceExpression> = Vec::new();
        let mut seen = Seen::default();
        let mut failed = false;

        while let Some(token) = self.cursor.eat_if(Token::is_sub_directive_value) {
            match self.parse_source_expression(token, seen, !sources.is_empty()) {
                Ok(expression) => {
                    seen.insert(Seen::of(&expression));
                    if sources.contains(&expression) {
                        self.warn(
                            token,
                            format!(
                                "Source list contains duplicate source expression \"{}\". All but the first instance will be ignored.",
                                expression
                            ),
                        );
                    } else {
                        sources.push(expression);
                    }
                }
                Err(_) => failed = true,
            }
        }

        if seen.contains(Seen::UNSAFE_HASHES) && !seen.contains(Seen::HASH) {
            self.warn(name, UNSAFE_HASHES_WITHOUT_HASH);
        }
        if failed {
            return Err(DirectiveFailure::InvalidSourceList);
        }
        Ok(sources)
    }

    fn parse_source_expression(
        &mut self,
        token: &SpannedToken,
        seen: Seen,
        seen_some: bool,
    ) -> Result<SourceExpression, ValueFailure> {
        let value = token.value.as_str();
        if seen.contains(Seen::NONE) || (seen_some && value.eq_ignore_ascii_case("'none'")) {
            self.error(token, "'none' must not be combined with any other source-expression.");
            return Err(ValueFailure::InvalidSourceExpression);
        }

        let keyword = match value.to_ascii_lowercase().as_str() {
            "'none'" => return Ok(SourceExpression::None),
            "'self'" => {
                if seen.contains(Seen::STRICT_DYNAMIC) {
                    self.info(token, STRICT_DYNAMIC_INEFFECTIVE);
                }
                Some(KeywordSource::SelfOrigin)
            }
            "'strict-dynamic'" => {
                if seen.contains_any(&[Seen::UNSAFE_INLINE, Seen::HOST_OR_SCHEME, Seen::SELF]) {
                    self.info(token, STRICT_DYNAMIC_INEFFECTIVE);
                }
                Some(KeywordSource::StrictDynamic)
            }
            "'unsafe-inline'" => {
                if seen.contains_any(&[Seen::HASH, Seen::NONCE]) {
                    self.info(token, UNSAFE_INLINE_INEFFECTIVE);
                }
                if seen.contains(Seen::STRICT_DYNAMIC) {
                    self.info(token, STRICT_DYNAMIC_INEFFECTIVE);
                }
                Some(KeywordSource::UnsafeInline)
            }
            "'unsafe-eval'" => Some(KeywordSource::UnsafeEval),
            "'unsafe-redirect'" => {
                self.warn(token, "'unsafe-redirect' has been removed from CSP as of version 2.0.");
                Some(KeywordSource::UnsafeRedirect)
            }
            "'unsafe-hashes'" => Some(KeywordSource::UnsafeHashes),
            "'report-sample'" => Some(KeywordSource::ReportSample),
            "'unsafe-allow-redirects'" => Some(KeywordSource::UnsafeAllowRedirects),
            _ => None,
        };
        if let Some(keyword) = keyword {
            return Ok(SourceExpression::Keyword(keyword));
        }

        self.check_for_unquoted_keyword(token);

        if let Some(nonce) = split_nonce_token(value) {
            let nonce = NonceSource::new(nonce);
            for problem in nonce.validation_errors() {
                self.warn(token, problem);
            }
            if seen.contains(Seen::UNSAFE_INLINE) {
                self.info(token, UNSAFE_INLINE_INEFFECTIVE);
            }
            return Ok(SourceExpression::Nonce(nonce));
        }

        if let Some((size, digest)) = split_hash_token(value) {
            return self.parse_hash_source(token, size, digest, seen);
        }

        if let Some(scheme) = match_scheme_source(value) {
            if seen.contains(Seen::STRICT_DYNAMIC) {
                self.info(token, STRICT_DYNAMIC_INEFFECTIVE);
            }
            return Ok(SourceExpression::Scheme(scheme));
        }

        if value.eq_ignore_ascii_case("'unsafe-hashed-attributes'") {
            self.warn(
                token,
                "The CSP specification renamed 'unsafe-hashed-attributes' to 'unsafe-hashes' (June 2018).",
            );
        } else if let Some(host) = match_host_source(value) {
            if seen.contains(Seen::STRICT_DYNAMIC) {
                self.info(token, STRICT_DYNAMIC_INEFFECTIVE);
            }
            return Ok(SourceExpression::Host(host));
        }

        self.error(
            token,
            format!("Expecting source-expression but found \"{}\".", value),
        );
        Err(ValueFailure::InvalidSourceExpression)
    }

    fn parse_hash_source(
        &mut self,
        token: &SpannedToken,
        size: &str,
        digest: &str,
        seen: Seen,
    ) -> Result<SourceExpression, ValueFailure> {
        let Some(algorithm) = HashAlgorithm::from_digest_size(size) else {
            self.error(
                token,
                format!("Unrecognised hash algorithm: \"{}\".", &token.value[1..7]),
            );
            return Err(ValueFailure::InvalidSourceExpression);
        };

        // URL-safe alphabet is tolerated but reported.
        let standard = digest.replace('-', "+").replace('_', "/");
        let value = match Base64Value::new(&standard) {
            Ok(value) => value,
            Err(e) => {
                self.error(token, e.to_string());
                return Err(ValueFailure::InvalidSourceExpression);
            }
        };
        if digest.contains(['-', '_']) {
            self.warn(
                token,
                "Invalid base64-value (characters are not in the base64-value grammar). Consider using RFC4648 compliant base64 encoding implementation.",
            );
        }

        let hash = HashSource::new(algorithm, value);
        if let Err(problem) = hash.validate() {
            self.error(token, problem);
            return Err(ValueFailure::InvalidSourceExpression);
        }
        if seen.contains(Seen::UNSAFE_INLINE) {
            self.info(token, UNSAFE_INLINE_INEFFECTIVE);
        }
        Ok(SourceExpression::Hash(hash))
    }

    // ── Ancestor source lists ──────────────────────────────

    pub(super) fn parse_ancestor_source_list(
        &mut self,
    ) -> Result<Vec<AncestorSource>, DirectiveFailure> {
        let mut sources: Vec<AncestorSource> = Vec::new();
        let mut seen_none = false;
        let mut failed = false;

        while let Some(token) = self.cursor.eat_if(Token::is_sub_directive_value) {
            match self.parse_ancestor_source(token, seen_none, !sources.is_empty()) {
                Ok(source) => {
                    seen_none |= source == AncestorSource::None;
                    if !sources.contains(&source) {
                        sources.push(source);
                    }
                }
                Err(_) => failed = true,
            }
        }

        if failed {
            return Err(DirectiveFailure::InvalidAncestorSourceList);
        }
        Ok(sources)
    }

    fn parse_ancestor_source(
        &mut self,
        token: &SpannedToken,
        seen_none: bool,
        seen_some: bool,
    ) -> Result<AncestorSource, ValueFailure> {
        let value = token.value.as_str();
        if seen_none || (seen_some && value.eq_ignore_ascii_case("'none'")) {
            self.error(token, "'none' must not be combined with any other ancestor-source.");
            return Err(ValueFailure::InvalidAncestorSource);
        }
        if value.eq_ignore_ascii_case("'none'") {
            return Ok(AncestorSource::None);
        }
        if value.eq_ignore_ascii_case("'self'") {
            return Ok(AncestorSource::SelfOrigin);
        }

        self.check_for_unquoted_keyword(token);

        if let Some(scheme) = match_scheme_source(value) {
            return Ok(AncestorSource::Scheme(scheme));
        }
        if let Some(host) = match_host_source(value) {
            return Ok(AncestorSource::Host(host));
        }

        self.error(
            token,
            format!("Expecting ancestor-source but found \"{}\".", value),
        );
        Err(ValueFailure::InvalidAncestorSource)
    }

    fn check_for_unquoted_keyword(&mut self, token: &SpannedToken) {
        if UNQUOTED_KEYWORD.is_match(&token.value) {
            self.warn(
                token,
                format!(
                    "This host name is unusual, and likely meant to be a keyword that is missing the required quotes: '{}'.",
                    token.value
                ),
            );
        }
    }
}

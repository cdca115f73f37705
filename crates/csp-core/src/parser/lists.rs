//! Grammars for the remaining directive values: media types, URI
//! references, enumerated token lists and the single-token directives.

use url::Url;

use crate::error::{DirectiveFailure, ValueFailure};
use crate::values::{MediaType, ReportToValue, Rfc7230Token};

use super::patterns::{MEDIA_TYPE, REFERRER_TOKEN, REQUIRE_SRI_FOR_TOKEN, RFC7230_TOKEN, SANDBOX_TOKEN};
use super::tokenizer::{SpannedToken, Token};
use super::Parser;

const SANDBOX_VOCABULARY: &str = "The sandbox directive should contain only allow-forms, allow-modals, allow-pointer-lock, allow-popups, allow-popups-to-escape-sandbox, allow-same-origin, allow-scripts, or allow-top-navigation.";

/// Push unless already present. Returns whether it was pushed.
fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) -> bool {
    if values.contains(&value) {
        return false;
    }
    values.push(value);
    true
}

impl<'t, 's> Parser<'t, 's> {
    /// Parse every remaining entry with `entry`. One failed entry fails the
    /// list with `failure`, after the rest have been checked.
    fn parse_list<T: PartialEq>(
        &mut self,
        failure: DirectiveFailure,
        mut entry: impl FnMut(&mut Self, &'t SpannedToken) -> Result<T, ValueFailure>,
    ) -> Result<Vec<T>, DirectiveFailure> {
        let mut values = Vec::new();
        let mut failed = false;
        while let Some(token) = self.cursor.eat_if(Token::is_sub_directive_value) {
            match entry(self, token) {
                Ok(value) => {
                    push_unique(&mut values, value);
                }
                Err(_) => failed = true,
            }
        }
        if failed {
            return Err(failure);
        }
        Ok(values)
    }

    // ── Media types ────────────────────────────────────────

    pub(super) fn parse_media_type_list(&mut self) -> Result<Vec<MediaType>, DirectiveFailure> {
        self.parse_list(DirectiveFailure::InvalidMediaTypeList, Self::parse_media_type)
    }

    fn parse_media_type(&mut self, token: &'t SpannedToken) -> Result<MediaType, ValueFailure> {
        if let Some(captures) = MEDIA_TYPE.captures(&token.value) {
            return Ok(MediaType::new(&captures["type"], &captures["subtype"]));
        }
        self.error(
            token,
            format!("Expecting media-type but found \"{}\".", token.value),
        );
        Err(ValueFailure::InvalidMediaType)
    }

    // ── URI references ─────────────────────────────────────

    pub(super) fn parse_uri_list(&mut self) -> Result<Vec<Url>, DirectiveFailure> {
        self.parse_list(DirectiveFailure::InvalidUriReferenceList, Self::parse_uri)
    }

    /// Resolve against the policy's origin.
    fn parse_uri(&mut self, token: &'t SpannedToken) -> Result<Url, ValueFailure> {
        match self.origin.join(&token.value) {
            Ok(url) => Ok(url),
            Err(e) => {
                tracing::trace!(uri = %token.value, error = %e, "unresolvable uri-reference");
                self.error(
                    token,
                    format!("Expecting uri-reference but found \"{}\".", token.value),
                );
                Err(ValueFailure::InvalidUriReference)
            }
        }
    }

    // ── Enumerated token lists ─────────────────────────────

    pub(super) fn parse_require_sri_for_token_list(
        &mut self,
        name: &SpannedToken,
    ) -> Result<Vec<Rfc7230Token>, DirectiveFailure> {
        let mut tokens = Vec::new();
        let mut failed = false;
        while let Some(token) = self.cursor.eat_if(Token::is_sub_directive_value) {
            match self.parse_require_sri_for_token(token) {
                Ok(value) => {
                    let shown = value.to_string();
                    if !push_unique(&mut tokens, value) {
                        self.warn(
                            name,
                            format!(
                                "The require-sri-for directive contains duplicate token: \"{}\".",
                                shown
                            ),
                        );
                    }
                }
                Err(_) => failed = true,
            }
        }
        if failed {
            return Err(DirectiveFailure::InvalidRequireSriForTokenList);
        }
        if tokens.is_empty() {
            self.warn(name, "Empty require-sri-for directive has no effect.");
        }
        Ok(tokens)
    }

    fn parse_require_sri_for_token(
        &mut self,
        token: &SpannedToken,
    ) -> Result<Rfc7230Token, ValueFailure> {
        if REQUIRE_SRI_FOR_TOKEN.is_match(&token.value) {
            return Ok(Rfc7230Token(token.value.to_ascii_lowercase()));
        }
        self.warn(
            token,
            "The require-sri-for directive should contain only \"script\", \"style\" tokens.",
        );
        self.rfc7230_token(token)
            .ok_or(ValueFailure::InvalidRequireSriForToken)
    }

    pub(super) fn parse_sandbox_token_list(&mut self) -> Result<Vec<Rfc7230Token>, DirectiveFailure> {
        self.parse_list(DirectiveFailure::InvalidSandboxTokenList, Self::parse_sandbox_token)
    }

    fn parse_sandbox_token(&mut self, token: &'t SpannedToken) -> Result<Rfc7230Token, ValueFailure> {
        if SANDBOX_TOKEN.is_match(&token.value) {
            return Ok(Rfc7230Token(token.value.clone()));
        }
        self.warn(token, SANDBOX_VOCABULARY);
        self.rfc7230_token(token).ok_or(ValueFailure::InvalidSandboxToken)
    }

    /// Accept `token` as a bare RFC 7230 token, or report it.
    fn rfc7230_token(&mut self, token: &SpannedToken) -> Option<Rfc7230Token> {
        if RFC7230_TOKEN.is_match(&token.value) {
            return Some(Rfc7230Token(token.value.clone()));
        }
        self.error(
            token,
            format!("Expecting RFC 7230 token but found \"{}\".", token.value),
        );
        None
    }

    // ── Single tokens ──────────────────────────────────────

    pub(super) fn parse_referrer_token(
        &mut self,
        name: &SpannedToken,
    ) -> Result<Rfc7230Token, DirectiveFailure> {
        let Some(token) = self.cursor.eat_if(Token::is_directive_value) else {
            self.error(
                name,
                "The referrer directive must contain exactly one referrer directive value.",
            );
            return Err(DirectiveFailure::InvalidDirectiveValue);
        };
        if REFERRER_TOKEN.is_match(&token.value) {
            return Ok(Rfc7230Token(token.value.clone()));
        }
        self.error(
            token,
            format!("Expecting referrer directive value but found \"{}\".", token.value),
        );
        Err(DirectiveFailure::InvalidReferrerToken)
    }

    pub(super) fn parse_report_to_token(
        &mut self,
        name: &SpannedToken,
    ) -> Result<ReportToValue, DirectiveFailure> {
        let Some(token) = self.cursor.eat_if(Token::is_directive_value) else {
            self.error(name, "The report-to directive must contain exactly one RFC 7230 token.");
            return Err(DirectiveFailure::InvalidReportToToken);
        };
        if RFC7230_TOKEN.is_match(&token.value) {
            return Ok(ReportToValue(token.value.clone()));
        }
        self.error(
            token,
            format!("Expecting RFC 7230 token but found \"{}\".", token.value),
        );
        Err(DirectiveFailure::InvalidReportToToken)
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::directive::DirectiveKind;
    use crate::notice::{Notice, Severity};
    use crate::parser::parse_policy;
    use crate::policy::Policy;

    fn parse(input: &str) -> (Policy, Vec<Notice>) {
        let origin = Url::parse("https://example.com/app/page").unwrap();
        let mut notices = Vec::new();
        let policy = parse_policy(input, &origin, &mut notices);
        (policy, notices)
    }

    fn count(notices: &[Notice], severity: Severity) -> usize {
        notices.iter().filter(|n| n.severity == severity).count()
    }

    // ── Media types ───────────────────────────────────────

    #[test]
    fn test_media_type_duplicates_collapse() {
        let (policy, notices) = parse("plugin-types a/b a/b c/d");
        assert!(notices.is_empty());
        assert_eq!(policy.to_string(), "plugin-types a/b c/d");
    }

    #[test]
    fn test_media_type_half_missing() {
        for value in ["a/", "/b", "a/b/c"] {
            let (policy, notices) = parse(&format!("plugin-types {}", value));
            assert!(policy.is_empty(), "{}", value);
            assert_eq!(notices.len(), 1, "{}", value);
        }
    }

    // ── URI references ────────────────────────────────────

    #[test]
    fn test_uri_relative_resolution() {
        let (policy, _) = parse("report-uri ../r report /abs?x=1");
        assert_eq!(
            policy.get(DirectiveKind::ReportUri).unwrap().to_string(),
            "report-uri https://example.com/r https://example.com/app/report https://example.com/abs?x=1"
        );
    }

    #[test]
    fn test_uri_unresolvable() {
        let (policy, notices) = parse("report-uri /ok http://a.com:99999/");
        assert!(policy.is_empty());
        assert_eq!(count(&notices, Severity::Error), 1);
        assert_eq!(
            notices.last().unwrap().message,
            "Expecting uri-reference but found \"http://a.com:99999/\"."
        );
    }

    // ── require-sri-for ───────────────────────────────────

    #[test]
    fn test_require_sri_for() {
        let (policy, notices) = parse("require-sri-for SCRIPT style");
        assert!(notices.is_empty());
        assert_eq!(policy.to_string(), "require-sri-for script style");
    }

    #[test]
    fn test_require_sri_for_duplicate() {
        let (policy, notices) = parse("require-sri-for script Script");
        assert_eq!(policy.to_string(), "require-sri-for script");
        assert_eq!(count(&notices, Severity::Warning), 1);
        assert_eq!(
            notices[0].message,
            "The require-sri-for directive contains duplicate token: \"script\"."
        );
    }

    #[test]
    fn test_require_sri_for_unknown_token() {
        let (policy, notices) = parse("require-sri-for script font");
        assert_eq!(policy.to_string(), "require-sri-for script font");
        assert_eq!(count(&notices, Severity::Warning), 1);

        let (policy, notices) = parse("require-sri-for a/b");
        assert!(policy.is_empty());
        assert_eq!(count(&notices, Severity::Warning), 1);
        assert_eq!(count(&notices, Severity::Error), 1);
    }

    #[test]
    fn test_require_sri_for_empty() {
        let (policy, notices) = parse("require-sri-for");
        assert!(policy.contains(DirectiveKind::RequireSriFor));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Empty require-sri-for directive has no effect.");
    }

    // ── sandbox ───────────────────────────────────────────

    #[test]
    fn test_sandbox() {
        let (policy, notices) = parse("sandbox allow-scripts ALLOW-FORMS allow-scripts");
        assert!(notices.is_empty());
        assert_eq!(policy.to_string(), "sandbox allow-scripts ALLOW-FORMS");

        let (policy, notices) = parse("sandbox");
        assert_eq!(policy.to_string(), "sandbox");
        assert!(notices.is_empty());
    }

    #[test]
    fn test_sandbox_unknown_token_kept() {
        let (policy, notices) = parse("sandbox abc");
        assert_eq!(policy.to_string(), "sandbox abc");
        assert_eq!(count(&notices, Severity::Warning), 1);
    }

    #[test]
    fn test_sandbox_invalid_token() {
        let (policy, notices) = parse("sandbox allow-forms a/b");
        assert!(policy.is_empty());
        assert_eq!(count(&notices, Severity::Error), 1);
        assert_eq!(
            notices.last().unwrap().message,
            "Expecting RFC 7230 token but found \"a/b\"."
        );
    }

    // ── referrer and report-to ────────────────────────────

    #[test]
    fn test_referrer() {
        let (policy, notices) = parse("referrer No-Referrer");
        assert_eq!(policy.to_string(), "referrer No-Referrer");
        assert_eq!(count(&notices, Severity::Warning), 1);

        let (policy, notices) = parse("referrer origin unsafe-url");
        assert!(policy.is_empty());
        assert_eq!(
            notices.last().unwrap().message,
            "Expecting referrer directive value but found \"origin unsafe-url\"."
        );

        let (policy, notices) = parse("referrer");
        assert!(policy.is_empty());
        assert_eq!(
            notices.last().unwrap().message,
            "The referrer directive must contain exactly one referrer directive value."
        );
    }

    #[test]
    fn test_report_to() {
        let (policy, notices) = parse("report-to csp-endpoint  ");
        assert!(notices.is_empty());
        assert_eq!(policy.to_string(), "report-to csp-endpoint");

        let (policy, notices) = parse("report-to");
        assert!(policy.is_empty());
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0].message,
            "The report-to directive must contain exactly one RFC 7230 token."
        );

        let (policy, notices) = parse("report-to a b");
        assert!(policy.is_empty());
        assert_eq!(notices[0].message, "Expecting RFC 7230 token but found \"a b\".");
    }
}

//! CSP Parser - tokenizer, cursor, and recursive descent grammar
//!
//! Converts policy header text into [`Policy`] values, reporting every
//! problem it meets as a [`Notice`] instead of failing.
//!
//! # Recovery
//!
//! A grammar rule that cannot make sense of its input records exactly one
//! notice and returns a local failure to its caller. A failed list entry
//! marks the whole list (and so the directive) as failed, but the remaining
//! entries are still consumed and checked. A failed directive is dropped and
//! parsing resumes at the next directive separator. Nothing aborts the policy.

pub mod cursor;
pub mod patterns;
pub mod tokenizer;

mod lists;
mod source_list;

use url::Url;

use crate::directive::DirectiveKind;
use crate::error::DirectiveFailure;
use crate::notice::{Notice, NoticeSink, Severity};
use crate::policy::{Directive, DirectiveValues, Policy};
use cursor::TokenCursor;
use tokenizer::{SpannedToken, Token, Tokenizer};

/// Parse a single policy. Anything after the policy is reported as an error.
///
/// # Guarantees
/// - Never fails: malformed input yields a smaller policy plus notices
/// - Deterministic: same input always produces the same policy and notices
///
/// # Example
/// ```
/// let origin = url::Url::parse("https://example.com").unwrap();
/// let mut notices = Vec::new();
/// let policy = csp_core::parser::parse_policy("img-src 'self'", &origin, &mut notices);
/// assert_eq!(policy.to_string(), "img-src 'self'");
/// assert!(notices.is_empty());
/// ```
pub fn parse_policy(text: &str, origin: &Url, notices: &mut dyn NoticeSink) -> Policy {
    let tokens = Tokenizer::new(text).tokenize();
    Parser::new(&tokens, origin, notices).parse_policy_and_assert_eof()
}

/// Parse a comma-separated list of policies.
pub fn parse_policy_list(text: &str, origin: &Url, notices: &mut dyn NoticeSink) -> Vec<Policy> {
    let tokens = Tokenizer::new(text).tokenize();
    Parser::new(&tokens, origin, notices).parse_policy_list_and_assert_eof()
}

/// Parser over one token stream. Build a fresh one per input.
pub(crate) struct Parser<'t, 's> {
    cursor: TokenCursor<'t>,
    origin: &'t Url,
    notices: &'s mut dyn NoticeSink,
}

impl<'t, 's> Parser<'t, 's> {
    pub(crate) fn new(
        tokens: &'t [SpannedToken],
        origin: &'t Url,
        notices: &'s mut dyn NoticeSink,
    ) -> Self {
        Parser {
            cursor: TokenCursor::new(tokens),
            origin,
            notices,
        }
    }

    // ── Notices ────────────────────────────────────────────

    fn notice(&mut self, severity: Severity, token: &SpannedToken, message: String) {
        self.notices.push(Notice::new(severity, message, Some(token.span)));
    }

    fn error(&mut self, token: &SpannedToken, message: impl Into<String>) {
        self.notice(Severity::Error, token, message.into());
    }

    fn warn(&mut self, token: &SpannedToken, message: impl Into<String>) {
        self.notice(Severity::Warning, token, message.into());
    }

    fn info(&mut self, token: &SpannedToken, message: impl Into<String>) {
        self.notice(Severity::Info, token, message.into());
    }

    // ── Policies ───────────────────────────────────────────

    pub(crate) fn parse_policy(&mut self) -> Policy {
        let mut policy = Policy::new(self.origin.clone());

        while self.cursor.has_next() {
            if self.cursor.next_is(Token::is_policy_separator) {
                break;
            }
            if self.cursor.eat_if(Token::is_directive_separator).is_some() {
                continue;
            }

            let start = self.cursor.peek();
            match self.parse_directive() {
                Ok(directive) => {
                    tracing::trace!(directive = %directive.kind, "parsed directive");
                    let kind = directive.kind;
                    if !policy.add_directive(directive) {
                        tracing::debug!(directive = %kind, "ignoring duplicate directive");
                        if let Some(token) = start {
                            self.warn(
                                token,
                                format!(
                                    "Policy contains more than one {} directive. All but the first instance will be ignored.",
                                    kind
                                ),
                            );
                        }
                    }
                }
                Err(failure) => {
                    tracing::debug!(reason = %failure, "dropped directive");
                }
            }
        }

        policy
    }

    pub(crate) fn parse_policy_and_assert_eof(&mut self) -> Policy {
        let policy = self.parse_policy();
        if let Some(token) = self.cursor.advance() {
            self.error(
                token,
                format!("Expecting end of policy but found \"{}\".", token.value),
            );
        }
        tracing::debug!(directives = policy.len(), "parsed policy");
        policy
    }

    pub(crate) fn parse_policy_list(&mut self) -> Vec<Policy> {
        let mut policies = vec![self.parse_policy()];
        while self.cursor.next_is(Token::is_policy_separator) {
            while self.cursor.eat_if(Token::is_policy_separator).is_some() {}
            policies.push(self.parse_policy());
        }
        policies
    }

    pub(crate) fn parse_policy_list_and_assert_eof(&mut self) -> Vec<Policy> {
        let policies = self.parse_policy_list();
        if let Some(token) = self.cursor.advance() {
            self.error(
                token,
                format!("Expecting end of policy list but found \"{}\".", token.value),
            );
        }
        tracing::debug!(policies = policies.len(), "parsed policy list");
        policies
    }

    // ── Directives ─────────────────────────────────────────

    fn parse_directive(&mut self) -> Result<Directive, DirectiveFailure> {
        let Some(token) = self.cursor.advance() else {
            return Err(DirectiveFailure::MissingDirectiveName);
        };
        let Token::DirectiveName(kind) = token.token else {
            let first_word = token.value.split(' ').next().unwrap_or_default();
            self.error(
                token,
                format!("Expecting directive-name but found \"{}\".", first_word),
            );
            return Err(DirectiveFailure::MissingDirectiveName);
        };

        let result = self.parse_directive_value(kind, token);

        // Stray characters inside the value reject the directive, whatever
        // its own grammar made of the rest.
        if let Some(unknown) = self.cursor.eat_if(Token::is_unknown) {
            let ch = unknown.value.chars().next().unwrap_or_default();
            self.error(
                unknown,
                format!(
                    "Expecting directive-value but found U+{:04X} ({}). Non-ASCII and non-printable characters must be percent-encoded.",
                    ch as u32, ch
                ),
            );
            return Err(DirectiveFailure::InvalidDirectiveValue);
        }

        result
    }

    /// Dispatch to the grammar of `kind`. `name` is the directive-name token.
    fn parse_directive_value(
        &mut self,
        kind: DirectiveKind,
        name: &SpannedToken,
    ) -> Result<Directive, DirectiveFailure> {
        use DirectiveKind::*;

        let values = match kind {
            BaseUri | ConnectSrc | DefaultSrc | FontSrc | FormAction | FrameSrc | ImgSrc
            | MediaSrc | NavigateTo | ObjectSrc | PrefetchSrc | ScriptSrc | ScriptSrcAttr
            | ScriptSrcElem | StyleSrc | StyleSrcAttr | StyleSrcElem | WorkerSrc => {
                DirectiveValues::SourceList(self.parse_source_list(name)?)
            }
            ChildSrc => {
                self.warn(
                    name,
                    "The child-src directive is deprecated as of CSP level 3. Authors who wish to regulate nested browsing contexts and workers SHOULD use the frame-src and worker-src directives, respectively.",
                );
                DirectiveValues::SourceList(self.parse_source_list(name)?)
            }
            ManifestSrc => {
                self.warn_experimental_directive(name);
                DirectiveValues::SourceList(self.parse_source_list(name)?)
            }
            FrameAncestors => {
                DirectiveValues::AncestorSourceList(self.parse_ancestor_source_list()?)
            }
            PluginTypes => {
                let media_types = self.parse_media_type_list()?;
                if media_types.is_empty() {
                    self.error(name, "The media-type-list must contain at least one media-type.");
                    return Err(DirectiveFailure::InvalidMediaTypeList);
                }
                if media_types.iter().any(|m| m.has_wildcard()) {
                    self.warn(
                        name,
                        "Media types can only be matched literally. Make sure using `*` is not an oversight.",
                    );
                }
                DirectiveValues::MediaTypeList(media_types)
            }
            Referrer => {
                self.warn(
                    name,
                    "The referrer directive was an experimental directive that was proposed but never added to the CSP specification. Support for this directive will be removed. See Referrer Policy specification.",
                );
                DirectiveValues::Referrer(self.parse_referrer_token(name)?)
            }
            ReportTo => DirectiveValues::ReportTo(self.parse_report_to_token(name)?),
            ReportUri => {
                self.info(
                    name,
                    "A draft of the next version of CSP deprecates report-uri in favour of a new report-to directive.",
                );
                let uris = self.parse_uri_list()?;
                if uris.is_empty() {
                    self.error(name, "The report-uri directive must contain at least one uri-reference.");
                    return Err(DirectiveFailure::InvalidUriReferenceList);
                }
                DirectiveValues::UriList(uris)
            }
            RequireSriFor => DirectiveValues::TokenList(self.parse_require_sri_for_token_list(name)?),
            Sandbox => DirectiveValues::TokenList(self.parse_sandbox_token_list()?),
            BlockAllMixedContent | UpgradeInsecureRequests => {
                self.warn_experimental_directive(name);
                self.enforce_missing_directive_value(name)?;
                DirectiveValues::Empty
            }
            Allow => {
                self.error(
                    name,
                    "The allow directive has been replaced with default-src and is not in the CSP specification.",
                );
                self.cursor.eat_if(Token::is_directive_value);
                return Err(DirectiveFailure::InvalidDirectiveName);
            }
            Options => {
                self.error(
                    name,
                    "The options directive has been replaced with 'unsafe-inline' and 'unsafe-eval' and is not in the CSP specification.",
                );
                self.cursor.eat_if(Token::is_directive_value);
                return Err(DirectiveFailure::InvalidDirectiveName);
            }
            Unrecognised => {
                self.error(
                    name,
                    format!("Unrecognised directive-name: \"{}\".", name.value),
                );
                self.cursor.eat_if(Token::is_directive_value);
                return Err(DirectiveFailure::InvalidDirectiveName);
            }
        };

        Ok(Directive::new(kind, values))
    }

    fn warn_experimental_directive(&mut self, name: &SpannedToken) {
        self.warn(
            name,
            format!(
                "The {} directive is an experimental directive that will be likely added to the CSP specification.",
                name.value
            ),
        );
    }

    fn enforce_missing_directive_value(&mut self, name: &SpannedToken) -> Result<(), DirectiveFailure> {
        if self.cursor.eat_if(Token::is_directive_value).is_some() {
            self.error(
                name,
                format!("The {} directive must not contain any value.", name.value),
            );
            return Err(DirectiveFailure::NonEmptyValueTokenList);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ───────────────────────────────────────────

    fn origin() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    fn parse(input: &str) -> (Policy, Vec<Notice>) {
        let mut notices = Vec::new();
        let policy = parse_policy(input, &origin(), &mut notices);
        (policy, notices)
    }

    fn count(notices: &[Notice], severity: Severity) -> usize {
        notices.iter().filter(|n| n.severity == severity).count()
    }

    fn show(input: &str, kind: DirectiveKind) -> String {
        let (policy, _) = parse(input);
        policy
            .get(kind)
            .unwrap_or_else(|| panic!("{} should parse", input))
            .to_string()
    }

    // ── Policy assembly ───────────────────────────────────

    #[test]
    fn test_empty_policy() {
        let (policy, notices) = parse("");
        assert!(policy.is_empty());
        assert!(notices.is_empty());
        assert_eq!(policy.origin(), &origin());
    }

    #[test]
    fn test_separators_only() {
        let (policy, notices) = parse(" ;; ; ");
        assert!(policy.is_empty());
        assert!(notices.is_empty());
    }

    #[test]
    fn test_duplicates_first_wins() {
        let (policy, notices) = parse("img-src a;;; img-src b");
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.get(DirectiveKind::ImgSrc).unwrap().to_string(), "img-src a");
        assert_eq!(count(&notices, Severity::Warning), 1);
        assert!(notices[0].message.contains("more than one img-src directive"));
        assert_eq!(notices[0].span.unwrap().column, 14);
    }

    #[test]
    fn test_directive_order_preserved() {
        let (policy, _) = parse("script-src 'self'; default-src 'none'; img-src *");
        let names: Vec<_> = policy.directives().map(|d| d.name()).collect();
        assert_eq!(names, vec!["script-src", "default-src", "img-src"]);
    }

    #[test]
    fn test_bad_directive_does_not_abort_policy() {
        let (policy, notices) = parse("img-src 'none' 'self'; script-src 'self'");
        assert!(!policy.contains(DirectiveKind::ImgSrc));
        assert!(policy.contains(DirectiveKind::ScriptSrc));
        assert_eq!(count(&notices, Severity::Error), 1);
    }

    #[test]
    fn test_trailing_policy_is_error() {
        let (policy, notices) = parse("img-src a, script-src b");
        assert_eq!(policy.len(), 1);
        assert_eq!(count(&notices, Severity::Error), 1);
        assert_eq!(notices[0].message, "Expecting end of policy but found \",\".");
    }

    #[test]
    fn test_policy_list() {
        let mut notices = Vec::new();
        let policies = parse_policy_list("img-src a,, ,script-src b", &origin(), &mut notices);
        assert_eq!(policies.len(), 2);
        assert!(policies[0].contains(DirectiveKind::ImgSrc));
        assert!(policies[1].contains(DirectiveKind::ScriptSrc));
        assert!(notices.is_empty());
    }

    #[test]
    fn test_policy_list_trailing_separator() {
        let mut notices = Vec::new();
        let policies = parse_policy_list("img-src a,", &origin(), &mut notices);
        assert_eq!(policies.len(), 2);
        assert!(policies[1].is_empty());
    }

    #[test]
    fn test_missing_directive_name() {
        let (policy, notices) = parse("'self' x; img-src a");
        assert!(policy.contains(DirectiveKind::ImgSrc));
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Expecting directive-name but found \"'self'\".");
    }

    // ── Dispatch ──────────────────────────────────────────

    #[test]
    fn test_source_list_directives() {
        for name in [
            "base-uri", "connect-src", "default-src", "font-src", "form-action", "frame-src",
            "img-src", "media-src", "navigate-to", "object-src", "prefetch-src", "script-src",
            "script-src-elem", "script-src-attr", "style-src", "style-src-elem",
            "style-src-attr", "worker-src",
        ] {
            let (policy, notices) = parse(&format!("{} *", name));
            assert_eq!(policy.len(), 1, "{}", name);
            assert!(notices.is_empty(), "{}: {:?}", name, notices);
        }
    }

    #[test]
    fn test_child_src_deprecated() {
        let (policy, notices) = parse("child-src *");
        assert!(policy.contains(DirectiveKind::ChildSrc));
        assert_eq!(count(&notices, Severity::Warning), 1);
        assert!(notices[0].message.contains("deprecated"));
    }

    #[test]
    fn test_manifest_src_experimental() {
        let (policy, notices) = parse("manifest-src 'self'");
        assert!(policy.contains(DirectiveKind::ManifestSrc));
        assert_eq!(count(&notices, Severity::Warning), 1);
        assert!(notices[0].message.contains("experimental"));
    }

    #[test]
    fn test_directive_names_case_insensitive() {
        let (policy, notices) = parse("SCRIPT-SRC 'SELF'");
        assert!(notices.is_empty());
        assert_eq!(policy.to_string(), "script-src 'self'");
    }

    #[test]
    fn test_value_less_directives() {
        for name in ["upgrade-insecure-requests", "block-all-mixed-content"] {
            let (policy, notices) = parse(name);
            assert!(policy.get(DirectiveKind::from_name(name)).is_some());
            assert_eq!(count(&notices, Severity::Warning), 1);

            let (policy, notices) = parse(&format!("{} now", name));
            assert!(policy.is_empty());
            assert_eq!(count(&notices, Severity::Error), 1);
            assert_eq!(
                notices.last().unwrap().message,
                format!("The {} directive must not contain any value.", name)
            );
        }
    }

    #[test]
    fn test_removed_directives() {
        let (policy, notices) = parse("allow 'self'; options inline-script; img-src a");
        assert_eq!(policy.len(), 1);
        assert_eq!(count(&notices, Severity::Error), 2);
        assert!(notices[0].message.contains("replaced with default-src"));
        assert!(notices[1].message.contains("'unsafe-inline' and 'unsafe-eval'"));
    }

    #[test]
    fn test_unrecognised_directive() {
        let (policy, notices) = parse("foo-src a b c; img-src a");
        assert_eq!(policy.len(), 1);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Unrecognised directive-name: \"foo-src\".");
    }

    #[test]
    fn test_unknown_character_rejects_directive() {
        let (policy, notices) = parse("sandbox a!*\n; img-src a");
        assert!(!policy.contains(DirectiveKind::Sandbox));
        assert!(policy.contains(DirectiveKind::ImgSrc));
        let errors: Vec<_> = notices.iter().filter(|n| n.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Expecting directive-value but found U+000A"));
    }

    #[test]
    fn test_non_ascii_code_point_reported() {
        let (policy, notices) = parse("img-src \u{e9}t\u{e9}");
        assert!(policy.is_empty());
        assert!(notices[0].message.contains("U+00E9 (\u{e9})"));
    }

    // ── plugin-types ──────────────────────────────────────

    #[test]
    fn test_plugin_types() {
        assert_eq!(show("plugin-types a/b", DirectiveKind::PluginTypes), "plugin-types a/b");
        assert_eq!(
            show("plugin-types a/b c/d", DirectiveKind::PluginTypes),
            "plugin-types a/b c/d"
        );
        assert_eq!(
            show("plugin-types X-A/X-B", DirectiveKind::PluginTypes),
            "plugin-types X-A/X-B"
        );
    }

    #[test]
    fn test_plugin_types_empty_or_malformed() {
        for input in ["plugin-types", "plugin-types /"] {
            let (policy, notices) = parse(input);
            assert!(policy.is_empty(), "{}", input);
            assert_eq!(count(&notices, Severity::Error), 1, "{}", input);
        }
    }

    #[test]
    fn test_plugin_types_wildcard_warns() {
        let (policy, notices) = parse("plugin-types */*");
        assert!(policy.contains(DirectiveKind::PluginTypes));
        assert_eq!(count(&notices, Severity::Warning), 1);
    }

    #[test]
    fn test_plugin_types_bad_entry_drops_directive() {
        let (policy, notices) = parse("plugin-types a/b nope c/d");
        assert!(policy.is_empty());
        assert_eq!(count(&notices, Severity::Error), 1);
        assert_eq!(notices[0].message, "Expecting media-type but found \"nope\".");
    }

    // ── report-uri ────────────────────────────────────────

    #[test]
    fn test_report_uri_resolved_against_origin() {
        let (policy, notices) = parse("report-uri /csp-report https://r.example.org/x");
        assert_eq!(
            policy.get(DirectiveKind::ReportUri).unwrap().to_string(),
            "report-uri https://example.com/csp-report https://r.example.org/x"
        );
        assert_eq!(count(&notices, Severity::Info), 1);
    }

    #[test]
    fn test_report_uri_empty() {
        let (policy, notices) = parse("report-uri");
        assert!(policy.is_empty());
        assert_eq!(count(&notices, Severity::Error), 1);
        assert_eq!(count(&notices, Severity::Info), 1);
    }

    // ── Determinism ───────────────────────────────────────

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = "default-src 'self'; script-src 'strict-dynamic' 'self' 'nonce-abc'; img-src a;; img-src b";
        let first = parse(input);
        for i in 0..100 {
            assert_eq!(first, parse(input), "Determinism failure at iteration {}", i);
        }
    }

    #[test]
    fn test_silent_sink_same_policy() {
        let input = "script-src 'unsafe-inline' 'nonce-abc' x_y; img-src *";
        let (loud, _) = parse(input);
        let quiet = parse_policy(input, &origin(), &mut crate::notice::Silent);
        assert_eq!(loud, quiet);
        assert!(quiet.get(DirectiveKind::ImgSrc).is_some());
    }
}

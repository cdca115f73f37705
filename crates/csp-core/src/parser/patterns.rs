//! Grammar patterns, compiled once

use std::sync::LazyLock;

use regex::Regex;

// ─── Cached regexes ─────────────────────────────────────────────────────────

/// `scheme ":"`
pub static SCHEME_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+\-.]*:$").expect("valid regex"));

/// `[scheme "://"] host [port] [path]`, query and fragment tolerated and dropped
pub static HOST_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<scheme>[a-zA-Z][a-zA-Z0-9+\-.]*://)?",
        r"(?P<host>\*|(?:\*\.)?[a-zA-Z0-9\-]+(?:\.[a-zA-Z0-9\-]+)*)",
        r"(?P<port>:(?:[0-9]+|\*))?",
        r"(?P<path>(?:/(?:[a-zA-Z0-9\-._~]|%[a-fA-F0-9]{2}|[!$&'()*+,;=]|[@:])*)+)?",
        r"(?:\?[^#]*)?(?:#.*)?$",
    ))
    .expect("valid regex")
});

/// `type "/" subtype`
pub static MEDIA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[!#$%&'*+\-.^_`|~0-9a-zA-Z]+)/(?P<subtype>[!#$%&'*+\-.^_`|~0-9a-zA-Z]+)$")
        .expect("valid regex")
});

/// RFC 7230 `token`
pub static RFC7230_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9a-zA-Z]+$").expect("valid regex"));

pub static REFERRER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:no-referrer|no-referrer-when-downgrade|origin|origin-when-cross-origin|origin-when-crossorigin|unsafe-url)$",
    )
    .expect("valid regex")
});

pub static SANDBOX_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:allow-forms|allow-modals|allow-orientation-lock|allow-pointer-lock|allow-popups",
        r"|allow-popups-to-escape-sandbox|allow-presentation|allow-same-origin|allow-scripts",
        r"|allow-top-navigation|allow-top-navigation-by-user-activation|allow-downloads)$",
    ))
    .expect("valid regex")
});

pub static REQUIRE_SRI_FOR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:script|style)$").expect("valid regex"));

/// A keyword written without its quotes
pub static UNQUOTED_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:self|unsafe-inline|unsafe-eval|unsafe-redirect|none|strict-dynamic|unsafe-hashes|report-sample|unsafe-allow-redirects)$",
    )
    .expect("valid regex")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_source_captures() {
        let caps = HOST_SOURCE.captures("https://a.com:888/ert").unwrap();
        assert_eq!(&caps["scheme"], "https://");
        assert_eq!(&caps["host"], "a.com");
        assert_eq!(&caps["port"], ":888");
        assert_eq!(&caps["path"], "/ert");
    }

    #[test]
    fn test_host_source_shapes() {
        for ok in ["*", "*.a", "*:12", "*/abc", "a.b-c.com", "x://y:*", "a.com/p?q=1#f"] {
            assert!(HOST_SOURCE.is_match(ok), "{} should match", ok);
        }
        for bad in ["abc_", "abc..", "*:ee", "'self'", "*.*.a", "a.com:"] {
            assert!(!HOST_SOURCE.is_match(bad), "{} should not match", bad);
        }
    }

    #[test]
    fn test_scheme_source() {
        assert!(SCHEME_SOURCE.is_match("https:"));
        assert!(SCHEME_SOURCE.is_match("web+app:"));
        assert!(!SCHEME_SOURCE.is_match("https://"));
        assert!(!SCHEME_SOURCE.is_match("1http:"));
    }

    #[test]
    fn test_media_type() {
        assert!(MEDIA_TYPE.is_match("application/x-shockwave-flash"));
        assert!(MEDIA_TYPE.is_match("*/*"));
        assert!(!MEDIA_TYPE.is_match("/"));
        assert!(!MEDIA_TYPE.is_match("a/"));
        assert!(!MEDIA_TYPE.is_match("a/b/c"));
    }

    #[test]
    fn test_token_vocabularies() {
        assert!(RFC7230_TOKEN.is_match("a!*"));
        assert!(!RFC7230_TOKEN.is_match("a/b"));
        assert!(SANDBOX_TOKEN.is_match("Allow-Scripts"));
        assert!(!SANDBOX_TOKEN.is_match("allow-everything"));
        assert!(REQUIRE_SRI_FOR_TOKEN.is_match("STYLE"));
        assert!(REFERRER_TOKEN.is_match("no-referrer"));
        assert!(!REFERRER_TOKEN.is_match("no-referrer extra"));
        assert!(UNQUOTED_KEYWORD.is_match("Self"));
        assert!(!UNQUOTED_KEYWORD.is_match("'self'"));
    }
}

//! Source expressions and ancestor sources

use std::fmt;

use super::{HashSource, NonceSource};

/// Port of a host-source.
///
/// `Unspecified` and `Wildcard` are distinct from every numeric port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Unspecified,
    Wildcard,
    Number(u16),
}

impl Port {
    /// Port implied by a scheme when none is written.
    pub fn default_for_scheme(scheme: &str) -> Port {
        match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => Port::Number(80),
            "https" | "wss" => Port::Number(443),
            "ftp" => Port::Number(21),
            _ => Port::Unspecified,
        }
    }
}

/// `'self'`, `'unsafe-inline'` and friends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordSource {
    SelfOrigin,
    UnsafeInline,
    UnsafeEval,
    StrictDynamic,
    UnsafeHashes,
    ReportSample,
    UnsafeAllowRedirects,
    /// Removed in CSP 2; still parsed so it can be reported
    UnsafeRedirect,
}

impl KeywordSource {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordSource::SelfOrigin => "'self'",
            KeywordSource::UnsafeInline => "'unsafe-inline'",
            KeywordSource::UnsafeEval => "'unsafe-eval'",
            KeywordSource::StrictDynamic => "'strict-dynamic'",
            KeywordSource::UnsafeHashes => "'unsafe-hashes'",
            KeywordSource::ReportSample => "'report-sample'",
            KeywordSource::UnsafeAllowRedirects => "'unsafe-allow-redirects'",
            KeywordSource::UnsafeRedirect => "'unsafe-redirect'",
        }
    }
}

impl fmt::Display for KeywordSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `scheme:`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemeSource {
    pub scheme: String,
}

impl SchemeSource {
    pub fn new(scheme: impl Into<String>) -> Self {
        SchemeSource { scheme: scheme.into() }
    }
}

impl fmt::Display for SchemeSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.scheme)
    }
}

/// `[scheme://]host[:port][path]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSource {
    pub scheme: Option<String>,
    pub host: String,
    pub port: Port,
    pub path: Option<String>,
}

impl HostSource {
    pub fn new(
        scheme: Option<String>,
        host: impl Into<String>,
        port: Port,
        path: Option<String>,
    ) -> Self {
        HostSource {
            scheme,
            host: host.into(),
            port,
            path,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.scheme.is_none() && self.host == "*" && self.port == Port::Unspecified && self.path.is_none()
    }

    fn has_default_port(&self) -> bool {
        match (&self.scheme, self.port) {
            (_, Port::Unspecified) => true,
            (Some(scheme), port) => Port::default_for_scheme(scheme) == port,
            (None, _) => false,
        }
    }
}

impl fmt::Display for HostSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref scheme) = self.scheme {
            write!(f, "{}://", scheme)?;
        }
        f.write_str(&self.host)?;
        if !self.has_default_port() {
            match self.port {
                Port::Wildcard => f.write_str(":*")?,
                Port::Number(n) => write!(f, ":{}", n)?,
                Port::Unspecified => {}
            }
        }
        if let Some(ref path) = self.path {
            f.write_str(path)?;
        }
        Ok(())
    }
}

/// One entry of a source-list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceExpression {
    None,
    Keyword(KeywordSource),
    Scheme(SchemeSource),
    Host(HostSource),
    Nonce(NonceSource),
    Hash(HashSource),
}

impl fmt::Display for SourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceExpression::None => f.write_str("'none'"),
            SourceExpression::Keyword(k) => write!(f, "{}", k),
            SourceExpression::Scheme(s) => write!(f, "{}", s),
            SourceExpression::Host(h) => write!(f, "{}", h),
            SourceExpression::Nonce(n) => write!(f, "{}", n),
            SourceExpression::Hash(h) => write!(f, "{}", h),
        }
    }
}

/// One entry of `frame-ancestors`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AncestorSource {
    None,
    SelfOrigin,
    Scheme(SchemeSource),
    Host(HostSource),
}

impl fmt::Display for AncestorSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AncestorSource::None => f.write_str("'none'"),
            AncestorSource::SelfOrigin => f.write_str("'self'"),
            AncestorSource::Scheme(s) => write!(f, "{}", s),
            AncestorSource::Host(h) => write!(f, "{}", h),
        }
    }
}

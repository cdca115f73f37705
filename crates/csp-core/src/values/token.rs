//! Token-shaped values: media types, RFC 7230 tokens, report-to groups

use std::fmt;

/// `type/subtype` as used by `plugin-types`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    pub type_: String,
    pub subtype: String,
}

impl MediaType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        MediaType {
            type_: type_.into(),
            subtype: subtype.into(),
        }
    }

    /// Either half is `*`. Media types only match literally.
    pub fn has_wildcard(&self) -> bool {
        self.type_ == "*" || self.subtype == "*"
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}

/// An RFC 7230 `token` (sandbox flags, require-sri-for, referrer)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rfc7230Token(pub String);

impl fmt::Display for Rfc7230Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reporting group name carried by `report-to`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportToValue(pub String);

impl fmt::Display for ReportToValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

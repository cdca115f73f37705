//! Directive value types
//!
//! Everything a directive can carry once parsed: source expressions (and the
//! restricted ancestor-source subset), media types, RFC 7230 tokens and
//! report-to group names. URI references are plain [`url::Url`]s.
//!
//! Every type here displays as its canonical CSP text, and serializes as
//! that same text.

mod base64_value;
mod source;
mod token;

pub use base64_value::{Base64Error, Base64Value, HashAlgorithm, HashSource, NonceSource};
pub use source::{AncestorSource, HostSource, KeywordSource, Port, SchemeSource, SourceExpression};
pub use token::{MediaType, ReportToValue, Rfc7230Token};

/// Serialize a value as its `Display` text.
macro_rules! serialize_as_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )+
    };
}

serialize_as_display!(
    SourceExpression,
    AncestorSource,
    KeywordSource,
    SchemeSource,
    HostSource,
    NonceSource,
    HashSource,
    Base64Value,
    MediaType,
    Rfc7230Token,
    ReportToValue,
);

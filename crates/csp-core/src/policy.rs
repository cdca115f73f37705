//! Parsed policy model
//!
//! A [`Policy`] maps each directive kind to at most one [`Directive`], in the
//! order the directives first appeared. Duplicates are never merged during
//! parsing; callers that want union semantics (e.g. combining `report-uri`
//! lists from two headers) do it explicitly with [`Directive::merge`] or
//! [`Policy::merge_directive`].

use std::fmt;

use indexmap::IndexMap;
use url::Url;

use crate::directive::DirectiveKind;
use crate::values::*;
use crate::{Error, Result};

/// Values carried by a directive, typed by the directive's grammar
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum DirectiveValues {
    SourceList(Vec<SourceExpression>),
    AncestorSourceList(Vec<AncestorSource>),
    MediaTypeList(Vec<MediaType>),
    UriList(Vec<Url>),
    /// `sandbox` and `require-sri-for`
    TokenList(Vec<Rfc7230Token>),
    Referrer(Rfc7230Token),
    ReportTo(ReportToValue),
    /// Value-less directives
    Empty,
}

impl DirectiveValues {
    pub fn len(&self) -> usize {
        match self {
            DirectiveValues::SourceList(v) => v.len(),
            DirectiveValues::AncestorSourceList(v) => v.len(),
            DirectiveValues::MediaTypeList(v) => v.len(),
            DirectiveValues::UriList(v) => v.len(),
            DirectiveValues::TokenList(v) => v.len(),
            DirectiveValues::Referrer(_) | DirectiveValues::ReportTo(_) => 1,
            DirectiveValues::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical text of each value, in order.
    pub fn to_strings(&self) -> Vec<String> {
        fn show<T: ToString>(values: &[T]) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }
        match self {
            DirectiveValues::SourceList(v) => show(v),
            DirectiveValues::AncestorSourceList(v) => show(v),
            DirectiveValues::MediaTypeList(v) => show(v),
            DirectiveValues::UriList(v) => show(v),
            DirectiveValues::TokenList(v) => show(v),
            DirectiveValues::Referrer(t) => vec![t.to_string()],
            DirectiveValues::ReportTo(t) => vec![t.to_string()],
            DirectiveValues::Empty => Vec::new(),
        }
    }
}

/// Append the values of `other` not already in `into`.
fn union<T: PartialEq + Clone>(into: &mut Vec<T>, other: &[T]) {
    for value in other {
        if !into.contains(value) {
            into.push(value.clone());
        }
    }
}

/// One named clause of a policy
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub values: DirectiveValues,
}

impl Directive {
    pub fn new(kind: DirectiveKind, values: DirectiveValues) -> Self {
        Directive { kind, values }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Union `other`'s values into this directive.
    ///
    /// List values are appended in order, skipping ones already present.
    /// Single-valued directives keep their own value.
    ///
    /// # Errors
    /// Returns `MergeMismatch` if the directive kinds differ.
    pub fn merge(&mut self, other: &Directive) -> Result<()> {
        if self.kind != other.kind {
            return Err(Error::MergeMismatch {
                left: self.kind,
                right: other.kind,
            });
        }
        match (&mut self.values, &other.values) {
            (DirectiveValues::SourceList(a), DirectiveValues::SourceList(b)) => union(a, b),
            (DirectiveValues::AncestorSourceList(a), DirectiveValues::AncestorSourceList(b)) => {
                union(a, b)
            }
            (DirectiveValues::MediaTypeList(a), DirectiveValues::MediaTypeList(b)) => union(a, b),
            (DirectiveValues::UriList(a), DirectiveValues::UriList(b)) => union(a, b),
            (DirectiveValues::TokenList(a), DirectiveValues::TokenList(b)) => union(a, b),
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())?;
        for value in self.values.to_strings() {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// A parsed policy: its declaring origin and its directives
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Policy {
    origin: Url,
    directives: IndexMap<DirectiveKind, Directive>,
}

impl Policy {
    pub fn new(origin: Url) -> Self {
        Policy {
            origin,
            directives: IndexMap::new(),
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Directives in first-insertion order.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    pub fn get(&self, kind: DirectiveKind) -> Option<&Directive> {
        self.directives.get(&kind)
    }

    pub fn contains(&self, kind: DirectiveKind) -> bool {
        self.directives.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Insert a directive unless one of the same kind exists.
    ///
    /// Returns false (and leaves the policy untouched) for a duplicate.
    pub fn add_directive(&mut self, directive: Directive) -> bool {
        if self.directives.contains_key(&directive.kind) {
            return false;
        }
        self.directives.insert(directive.kind, directive);
        true
    }

    /// Merge into an existing directive of the same kind, or insert.
    pub fn merge_directive(&mut self, directive: Directive) -> Result<()> {
        match self.directives.get_mut(&directive.kind) {
            Some(existing) => existing.merge(&directive),
            None => {
                self.directives.insert(directive.kind, directive);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, directive) in self.directives().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", directive)?;
        }
        Ok(())
    }
}

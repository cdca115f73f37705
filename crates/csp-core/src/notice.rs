//! Notices - the diagnostics channel of the parser
//!
//! The parser never fails. Everything it has to say about the input goes
//! out as a [`Notice`] into a caller-supplied [`NoticeSink`]:
//!
//! - **Error**: grammar violation; the smallest enclosing value or directive
//!   was dropped
//! - **Warning**: deprecated, non-standard or silently ineffective construct;
//!   the value was kept
//! - **Info**: valid, but rendered inert by a sibling value

use crate::parser::tokenizer::Span;

/// Severity level for notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A single parser notice
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>, span: Option<Span>) -> Self {
        Notice {
            severity,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(ref span) = self.span {
            write!(f, "{} at {}: {}", self.severity, span, self.message)
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}

// ── Sinks ─────────────────────────────────────────────────

/// Append-only destination for notices. The parser never reads from it.
pub trait NoticeSink {
    fn push(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn push(&mut self, notice: Notice) {
        Vec::push(self, notice);
    }
}

/// Discards every notice. Parsing outcome is unaffected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl NoticeSink for Silent {
    fn push(&mut self, _notice: Notice) {}
}

// ── Parse result ──────────────────────────────────────────

/// A parsed value together with every notice emitted while producing it
#[derive(Debug, Clone, serde::Serialize)]
pub struct Parsed<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Parsed<T> {
    /// Returns true if no errors were reported (warnings and infos are OK)
    pub fn is_valid(&self) -> bool {
        !self.notices.iter().any(Notice::is_error)
    }

    /// Returns only error-level notices
    pub fn errors(&self) -> Vec<&Notice> {
        self.notices.iter().filter(|n| n.is_error()).collect()
    }

    /// Returns only warning-level notices
    pub fn warnings(&self) -> Vec<&Notice> {
        self.notices.iter().filter(|n| n.is_warning()).collect()
    }

    /// Returns only info-level notices
    pub fn infos(&self) -> Vec<&Notice> {
        self.notices.iter().filter(|n| n.is_info()).collect()
    }
}

//! CSP Tokenizer - converts policy header text into a classified token stream
//!
//! Handles: directive names, directive values (whole or split into
//! sub-directive values), directive separators (`;`), policy separators (`,`).
//! Characters outside the directive-value grammar are kept as `Unknown`
//! tokens so the parser can report them.
//!
//! Guarantees:
//! - Never fails: every input produces a token stream
//! - Deterministic: same input always produces same token stream
//! - line:column for every token

use crate::directive::DirectiveKind;

/// Token types for CSP header syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A directive name, already classified
    DirectiveName(DirectiveKind),
    /// The whole value of a single-valued directive
    DirectiveValue,
    /// One whitespace-separated entry of a list-valued directive
    SubDirectiveValue,
    DirectiveSeparator, // ;
    PolicySeparator,    // ,
    /// Text that is not part of the grammar, up to the next separator
    Unknown,
}

impl Token {
    pub fn is_directive_name(&self) -> bool {
        matches!(self, Token::DirectiveName(_))
    }

    /// Any directive value, whole or split.
    pub fn is_directive_value(&self) -> bool {
        matches!(self, Token::DirectiveValue | Token::SubDirectiveValue)
    }

    pub fn is_sub_directive_value(&self) -> bool {
        matches!(self, Token::SubDirectiveValue)
    }

    pub fn is_directive_separator(&self) -> bool {
        matches!(self, Token::DirectiveSeparator)
    }

    pub fn is_policy_separator(&self) -> bool {
        matches!(self, Token::PolicySeparator)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Token::Unknown)
    }
}

/// Position in source text for notice locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub line: usize,
    /// 1-based, counted in characters.
    pub column: usize,
    /// Byte offset into the header text.
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with its source text and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub value: String,
    pub span: Span,
}

/// Tokenizer for CSP header text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
    tokens: Vec<SpannedToken>,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(mut self) -> Vec<SpannedToken> {
        loop {
            self.skip_whitespace();

            let Some(ch) = self.peek() else {
                break;
            };
            let span = self.current_span();

            match ch {
                ';' => {
                    self.advance();
                    self.push(Token::DirectiveSeparator, ";".to_string(), span);
                }
                ',' => {
                    self.advance();
                    self.push(Token::PolicySeparator, ",".to_string(), span);
                }
                c if is_directive_name_char(c) => {
                    let kind = self.read_directive_name(span);
                    self.read_directive_value(kind);
                }
                _ => self.read_unknown(),
            }
        }

        tracing::trace!(tokens = self.tokens.len(), "tokenized policy text");
        self.tokens
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            self.offset += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn push(&mut self, token: Token, value: String, span: Span) {
        tracing::trace!(?token, %span, "token");
        self.tokens.push(SpannedToken { token, value, span });
    }

    /// Consume characters while `pred` holds and return them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    // ── Whitespace ─────────────────────────────────────────

    fn skip_whitespace(&mut self) {
        self.take_while(is_whitespace);
    }

    // ── Directive names ────────────────────────────────────

    fn read_directive_name(&mut self, span: Span) -> DirectiveKind {
        let name = self.take_while(is_directive_name_char);
        let kind = DirectiveKind::from_name(&name);
        self.push(Token::DirectiveName(kind), name, span);
        kind
    }

    // ── Directive values ───────────────────────────────────

    fn read_directive_value(&mut self, kind: DirectiveKind) {
        if kind.is_list_valued() {
            self.read_sub_directive_values();
        } else {
            self.read_whole_directive_value();
        }
    }

    fn read_sub_directive_values(&mut self) {
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(';') | Some(',') => return,
                Some(c) if is_directive_value_char(c) => {
                    let span = self.current_span();
                    let value = self.take_while(is_directive_value_char);
                    self.push(Token::SubDirectiveValue, value, span);
                }
                Some(_) => {
                    self.read_unknown();
                    return;
                }
            }
        }
    }

    fn read_whole_directive_value(&mut self) {
        self.skip_whitespace();
        match self.peek() {
            None | Some(';') | Some(',') => {}
            Some(c) if is_directive_value_char(c) => {
                let span = self.current_span();
                let value = self.take_while(|c| is_directive_value_char(c) || is_whitespace(c));
                let value = value.trim_end_matches(is_whitespace).to_string();
                self.push(Token::DirectiveValue, value, span);
                if matches!(self.peek(), Some(c) if c != ';' && c != ',') {
                    self.read_unknown();
                }
            }
            Some(_) => self.read_unknown(),
        }
    }

    // ── Unknown text ───────────────────────────────────────

    fn read_unknown(&mut self) {
        let span = self.current_span();
        let value = self.take_while(|c| c != ';' && c != ',');
        tracing::trace!(%span, "unknown text in policy");
        self.push(Token::Unknown, value, span);
    }
}

/// CSP whitespace is SP and HTAB only.
fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_directive_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Printable ASCII except `;` and `,`.
fn is_directive_value_char(c: char) -> bool {
    matches!(c, '\x21'..='\x2B' | '\x2D'..='\x3A' | '\x3C'..='\x7E')
}

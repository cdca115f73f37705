//! Single-pass reader over the token stream
//!
//! The cursor only moves forward. Every grammar rule consumes tokens
//! monotonically; there is no rewind and no random access.

use super::tokenizer::{SpannedToken, Token};

pub struct TokenCursor<'a> {
    tokens: &'a [SpannedToken],
    index: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        TokenCursor { tokens, index: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a SpannedToken> {
        self.tokens.get(self.index)
    }

    /// Whether the current token satisfies `kind`. False at end of input.
    pub fn next_is(&self, kind: impl Fn(&Token) -> bool) -> bool {
        self.tokens
            .get(self.index)
            .is_some_and(|t| kind(&t.token))
    }

    /// Return the current token and move past it. `None` at end of input.
    pub fn advance(&mut self) -> Option<&'a SpannedToken> {
        let tokens = self.tokens;
        let token = tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    /// Advance only if the current token satisfies `kind`.
    pub fn eat_if(&mut self, kind: impl Fn(&Token) -> bool) -> Option<&'a SpannedToken> {
        if self.next_is(kind) {
            self.advance()
        } else {
            None
        }
    }
}

//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use std::mem::discriminant;

use brine_diagnostic::ErrorCode;
use brine_ir::{Ident, Span, Token, TokenKind, TokenList};

use crate::ParseError;

/// Cursor for navigating tokens.
///
/// Invariant: the token list ends with [`TokenKind::Eof`] and the cursor
/// never moves past it.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: Span::DUMMY,
};

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor {
            tokens: tokens.as_slice(),
            pos: 0,
        }
    }

    /// Current position, used to check that a rule consumed something.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// One-token lookahead.
    pub fn peek_next_kind(&self) -> &'a TokenKind {
        self.tokens.get(self.pos + 1).map_or(&EOF.kind, |t| &t.kind)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check if the current token has the same kind as `kind`, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        discriminant(self.current_kind()) == discriminant(kind)
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Advance to the next token and return the consumed token.
    ///
    /// Stays on the final `Eof` token.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of kind `kind` or report what was found instead.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected `{kind}`, found {}",
                    self.current_kind().describe()
                ),
                self.current_span(),
            )
            .with_context(format!("expected `{kind}`")))
        }
    }

    pub fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.current();
        if let TokenKind::Ident(name) = &token.kind {
            self.advance();
            Ok(Ident::new(name.clone(), token.span))
        } else {
            Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected identifier, found {}", token.kind.describe()),
                token.span,
            )
            .with_context("expected identifier"))
        }
    }
}

//! Recursive descent parser for brine.
//!
//! Turns a [`TokenList`] into a [`SourceAst`]: `using` directives,
//! declarations and top-level statements. Syntax errors are collected as
//! [`ParseError`]s and parsing resumes at the next item or statement.

mod cursor;
mod grammar;
mod recovery;

pub use cursor::Cursor;
pub use recovery::{synchronize, RecoverySet};

use brine_diagnostic::{Diagnostic, ErrorCode};
use brine_ir::{FileUri, SourceAst, Span, TokenKind, TokenList};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            errors: Vec::new(),
        }
    }

    /// Parse a whole file.
    pub fn parse_file(mut self) -> ParseResult {
        let mut ast = SourceAst::default();

        while !self.cursor.is_at_end() {
            let start = self.cursor.position();
            match self.cursor.current_kind() {
                TokenKind::Using => match self.parse_using() {
                    Ok(using) => ast.usings.push(using),
                    Err(e) => self.recover(e, RecoverySet::ItemBoundary),
                },
                TokenKind::Fn
                | TokenKind::Method
                | TokenKind::Operator
                | TokenKind::Extern
                | TokenKind::Struct
                | TokenKind::Alias => match self.parse_item() {
                    Ok(item) => ast.items.push(item),
                    Err(e) => self.recover(e, RecoverySet::ItemBoundary),
                },
                _ => match self.parse_stmt() {
                    Ok(stmt) => ast.statements.push(stmt),
                    Err(e) => self.recover(e, RecoverySet::ItemBoundary),
                },
            }
            // Guarantee progress even if recovery stopped on the failing token.
            if self.cursor.position() == start {
                self.cursor.advance();
            }
        }

        ParseResult {
            ast,
            errors: self.errors,
        }
    }

    fn recover(&mut self, error: ParseError, set: RecoverySet) {
        tracing::trace!(code = %error.code, span = %error.span, "parse error, recovering");
        self.errors.push(error);
        recovery::synchronize(&mut self.cursor, set);
    }
}

/// Parse result containing the tree and any errors.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult {
    pub ast: SourceAst,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Convert every error into a diagnostic for `file`.
    pub fn diagnostics(&self, file: &FileUri) -> impl Iterator<Item = Diagnostic> + '_ {
        let file = file.clone();
        self.errors
            .iter()
            .map(move |e| e.to_diagnostic().with_file(file.clone()))
    }
}

/// Parse error with error code for rich diagnostics.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParseError {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Location of the error.
    pub span: Span,
    /// Optional label text for the span.
    pub context: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Add context for better error messages.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Convert to a full Diagnostic for rich error reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(&self.message)
            .with_label(self.span, self.context.as_deref().unwrap_or("here"))
    }
}

/// Parse tokens into a syntax tree.
#[tracing::instrument(level = "trace", skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &TokenList) -> ParseResult {
    Parser::new(tokens).parse_file()
}

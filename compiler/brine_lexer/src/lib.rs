//! Lexer for brine using logos.
//!
//! Produces a [`TokenList`] terminated by [`TokenKind::Eof`]. Problems are
//! reported into the caller's [`DiagnosticSink`]; the lexer always returns a
//! token list so the parser can keep going.
//!
//! # Preprocessor
//!
//! Lines of the form `#if NAME`, `#if !NAME`, `#else` and `#endif` select
//! which tokens reach the parser. `NAME` is looked up in the
//! [`PreprocessorVars`] passed by the caller; conditions nest.

use brine_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use brine_ir::{FileUri, Span, Token, TokenKind, TokenList};
use logos::Logos;
use rustc_hash::FxHashSet;

/// Raw token from logos (before payload conversion).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    // === Preprocessor ===
    #[regex(r"#if[ \t]+!?[A-Za-z_][A-Za-z0-9_]*")]
    PpIf,
    #[token("#else")]
    PpElse,
    #[token("#endif")]
    PpEndif,

    // === Keywords ===
    #[token("using")]
    Using,
    #[token("fn")]
    Fn,
    #[token("method")]
    Method,
    #[token("operator")]
    Operator,
    #[token("extern")]
    Extern,
    #[token("struct")]
    Struct,
    #[token("alias")]
    Alias,
    #[token("let")]
    Let,
    #[token("return")]
    Return,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // === Literals ===
    #[regex(r"[0-9]+\.[0-9]+")]
    Float,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedStr,
    #[regex(r"'[A-Za-z_][A-Za-z0-9_]*")]
    Label,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// Names defined for `#if` conditions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreprocessorVars {
    defined: FxHashSet<String>,
}

impl PreprocessorVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>) {
        self.defined.insert(name.into());
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PreprocessorVars {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PreprocessorVars {
            defined: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One open `#if` block.
struct Condition {
    /// Whether tokens in the current branch are kept.
    active: bool,
    seen_else: bool,
    span: Span,
}

struct Lexer<'a> {
    file: &'a FileUri,
    vars: &'a PreprocessorVars,
    diagnostics: &'a mut DiagnosticSink,
    conditions: Vec<Condition>,
    tokens: TokenList,
}

impl Lexer<'_> {
    fn error(&mut self, code: ErrorCode, span: Span, message: String, label: &str) {
        self.diagnostics.push(
            Diagnostic::error(code)
                .with_message(message)
                .with_file(self.file.clone())
                .with_label(span, label),
        );
    }

    fn emitting(&self) -> bool {
        self.conditions.iter().all(|c| c.active)
    }

    fn directive(&mut self, raw: RawToken, slice: &str, span: Span) {
        match raw {
            RawToken::PpIf => {
                let condition = slice["#if".len()..].trim();
                let (negated, name) = match condition.strip_prefix('!') {
                    Some(name) => (true, name),
                    None => (false, condition),
                };
                let active = self.vars.is_defined(name) != negated;
                self.conditions.push(Condition {
                    active,
                    seen_else: false,
                    span,
                });
            }
            RawToken::PpElse => match self.conditions.last_mut() {
                Some(cond) if !cond.seen_else => {
                    cond.seen_else = true;
                    cond.active = !cond.active;
                }
                Some(_) => self.error(
                    ErrorCode::E0004,
                    span,
                    "`#else` after `#else`".to_string(),
                    "second `#else` for the same `#if`",
                ),
                None => self.error(
                    ErrorCode::E0004,
                    span,
                    "`#else` without `#if`".to_string(),
                    "no open `#if`",
                ),
            },
            RawToken::PpEndif => {
                if self.conditions.pop().is_none() {
                    self.error(
                        ErrorCode::E0004,
                        span,
                        "`#endif` without `#if`".to_string(),
                        "no open `#if`",
                    );
                }
            }
            _ => {}
        }
    }

    fn convert(&mut self, raw: RawToken, slice: &str, span: Span) -> Option<TokenKind> {
        Some(match raw {
            RawToken::LineComment | RawToken::PpIf | RawToken::PpElse | RawToken::PpEndif => {
                return None
            }
            RawToken::Using => TokenKind::Using,
            RawToken::Fn => TokenKind::Fn,
            RawToken::Method => TokenKind::Method,
            RawToken::Operator => TokenKind::Operator,
            RawToken::Extern => TokenKind::Extern,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Alias => TokenKind::Alias,
            RawToken::Let => TokenKind::Let,
            RawToken::Return => TokenKind::Return,
            RawToken::While => TokenKind::While,
            RawToken::Break => TokenKind::Break,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Float => match slice.parse::<f64>() {
                Ok(v) => TokenKind::Float(v),
                Err(_) => {
                    self.invalid_number(slice, span);
                    TokenKind::Float(0.0)
                }
            },
            RawToken::Int => match slice.parse::<i64>() {
                Ok(v) => TokenKind::Int(v),
                Err(_) => {
                    self.invalid_number(slice, span);
                    TokenKind::Int(0)
                }
            },
            RawToken::Str => TokenKind::Str(unescape(&slice[1..slice.len() - 1])),
            RawToken::UnterminatedStr => {
                self.error(
                    ErrorCode::E0001,
                    span,
                    "unterminated string literal".to_string(),
                    "missing closing `\"`",
                );
                TokenKind::Str(unescape(&slice[1..]))
            }
            RawToken::Label => TokenKind::Label(slice[1..].to_string()),
            RawToken::Ident => TokenKind::Ident(slice.to_string()),
        })
    }

    fn invalid_number(&mut self, slice: &str, span: Span) {
        self.error(
            ErrorCode::E0003,
            span,
            format!("invalid number literal `{slice}`"),
            "number does not fit in 64 bits",
        );
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Tokenize `source`.
///
/// Diagnostics carry `file`; tokens excluded by `#if` conditions are dropped
/// before they reach the token list.
#[tracing::instrument(level = "trace", skip(source, diagnostics, vars), fields(len = source.len()))]
pub fn lex(
    source: &str,
    diagnostics: &mut DiagnosticSink,
    vars: &PreprocessorVars,
    file: &FileUri,
) -> TokenList {
    let mut lexer = Lexer {
        file,
        vars,
        diagnostics,
        conditions: Vec::new(),
        tokens: TokenList::new(),
    };
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::from_range(raw.span());
        let slice = raw.slice();
        let token = match result {
            Ok(token) => token,
            Err(()) => {
                if lexer.emitting() {
                    lexer.error(
                        ErrorCode::E0002,
                        span,
                        format!("invalid character `{slice}`"),
                        "not valid here",
                    );
                }
                continue;
            }
        };

        if matches!(token, RawToken::PpIf | RawToken::PpElse | RawToken::PpEndif) {
            lexer.directive(token, slice, span);
            continue;
        }
        if !lexer.emitting() {
            continue;
        }
        if let Some(kind) = lexer.convert(token, slice, span) {
            lexer.tokens.push(Token::new(kind, span));
        }
    }

    let unclosed: Vec<Span> = lexer.conditions.iter().map(|c| c.span).collect();
    for span in unclosed {
        lexer.error(
            ErrorCode::E0004,
            span,
            "`#if` without matching `#endif`".to_string(),
            "opened here",
        );
    }

    let end = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    lexer.tokens.push(Token::new(TokenKind::Eof, end));
    lexer.tokens
}

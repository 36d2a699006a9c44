//! Brine IR - shared front-end types.
//!
//! This crate holds the data every other compiler crate agrees on:
//! - [`Span`] for byte ranges inside one source file
//! - [`FileUri`] for the identity of a loaded file
//! - [`Token`] / [`TokenList`] produced by the lexer
//! - the syntax tree ([`ast`]) produced by the parser, including the
//!   `using` directives the source loader follows
//!
//! Nothing here performs I/O or resolution; these are plain values.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod span;
mod token;
mod uri;

pub use ast::{
    AliasDecl, BinaryOp, Block, DeclKind, Expr, ExprKind, FieldDecl, FunctionDecl, Ident, Item,
    ParamDecl, SourceAst, Stmt, StmtKind, StructDecl, TypeExpr, UsingDirective,
};
pub use span::{Span, SpanError};
pub use token::{Token, TokenKind, TokenList};
pub use uri::{split_scheme, FileUri, FILE_SCHEME};

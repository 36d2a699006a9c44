//! Diagnostic system for the brine compiler.
//!
//! Every expected failure (a missing import, an unresolvable call, a syntax
//! error) becomes a [`Diagnostic`] value that is appended to a
//! [`DiagnosticSink`]. Nothing in the compiler unwinds for those; only true
//! contract violations panic.
//!
//! A diagnostic carries:
//! - an [`ErrorCode`] for searchability
//! - a [`Severity`]
//! - the [`FileUri`](brine_ir::FileUri) it belongs to, when known
//! - labeled spans, notes and suggestions
//! - a nested `causes` chain explaining why (used by overload resolution to
//!   show why each candidate was rejected)

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod sink;
pub mod span_utils;

pub use diagnostic::{
    expected_expression, type_mismatch, unexpected_token, unknown_identifier, Diagnostic, Label,
    Severity,
};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use sink::{DiagnosticSink, SinkConfig};

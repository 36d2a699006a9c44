//! Grammar rules, one module per syntactic category.
//!
//! Each module extends [`Parser`](crate::Parser) with `parse_*` methods.

mod expr;
mod item;
mod stmt;
mod ty;

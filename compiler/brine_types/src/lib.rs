//! Semantic types for the brine resolver.
//!
//! - [`Type`]: the structural type of a value or declaration
//! - [`TypeMatch`]: the five ordered match tiers used to rank overloads
//! - [`TypeArgs`] with [`substitute`] and [`unify`] for generic declarations

mod core;
mod flags;
mod traverse;
mod type_args;
mod type_match;
mod unify;

pub use crate::core::Type;
pub use flags::TypeFlags;
pub use traverse::{collect_params, substitute, Substitutor, TypeFolder};
pub use type_args::TypeArgs;
pub use type_match::{implicit_cast, TypeMatch};
pub use unify::{unify, UnifyError};

//! Unification error types.

use std::fmt;

use crate::Type;

/// Why a declared (pattern) type could not be unified with an actual type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnifyError {
    /// The shapes differ: `[T]` against `int`.
    Mismatch { expected: Type, found: Type },

    /// A type parameter is already bound to a different type.
    Conflict {
        param: String,
        bound: Type,
        found: Type,
    },

    /// Same struct name with a different number of type arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::Mismatch { expected, found } => {
                write!(f, "expected `{expected}`, found `{found}`")
            }
            UnifyError::Conflict {
                param,
                bound,
                found,
            } => write!(
                f,
                "type parameter `{param}` is `{bound}` here but `{found}` elsewhere"
            ),
            UnifyError::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "`{name}` takes {expected} type argument(s), found {found}"
            ),
        }
    }
}

impl std::error::Error for UnifyError {}

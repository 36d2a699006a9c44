//! Unification of declared parameter types against argument types.
//!
//! One-sided: only the declared side may contain type parameters. Each
//! successful step may bind a parameter in the running [`TypeArgs`]; a
//! parameter bound twice must be bound to the same type (after alias
//! resolution) both times.
//!
//! ```text
//! let mut args = TypeArgs::new();
//! unify(&Type::array(Type::param("T")), &Type::array(Type::Int), &mut args)?;
//! assert_eq!(args.get("T"), Some(&Type::Int));
//! ```

mod error;

pub use error::UnifyError;

use crate::{Type, TypeArgs};

/// Unify `pattern` (declared, may mention parameters) with `actual`.
///
/// Positions of `pattern` without parameters always succeed here; whether
/// they match is decided later by [`TypeMatch`](crate::TypeMatch) tiers.
/// On error `args` may hold bindings made before the failing position.
pub fn unify(pattern: &Type, actual: &Type, args: &mut TypeArgs) -> Result<(), UnifyError> {
    if !pattern.has_params() {
        return Ok(());
    }

    match (pattern, actual) {
        (Type::Alias { target, .. }, _) => unify(target, actual, args),
        (_, Type::Alias { target, .. }) => unify(pattern, target, args),

        (Type::Param(name), _) => match args.get(name) {
            Some(bound) if bound.resolve_aliases() != actual.resolve_aliases() => {
                Err(UnifyError::Conflict {
                    param: name.clone(),
                    bound: bound.clone(),
                    found: actual.clone(),
                })
            }
            Some(_) => Ok(()),
            None => {
                args.insert(name.clone(), actual.clone());
                Ok(())
            }
        },

        (Type::Array(p), Type::Array(a)) => unify(p, a, args),

        (
            Type::Named { name, args: p_args },
            Type::Named {
                name: a_name,
                args: a_args,
            },
        ) if name == a_name => {
            if p_args.len() != a_args.len() {
                return Err(UnifyError::ArityMismatch {
                    name: name.clone(),
                    expected: p_args.len(),
                    found: a_args.len(),
                });
            }
            p_args
                .iter()
                .zip(a_args)
                .try_for_each(|(p, a)| unify(p, a, args))
        }

        _ => Err(UnifyError::Mismatch {
            expected: pattern.clone(),
            found: actual.clone(),
        }),
    }
}

#[cfg(test)]
mod tests;

//! Match tiers between an argument type and a declared type.

use std::fmt;

use crate::Type;

/// How well one type matches another, from no match to identity.
///
/// The order is the derive order: `None < Promotion < ImplicitCast < Same < Equals`.
/// For a whole parameter list the tier is the minimum over all parameters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub enum TypeMatch {
    /// Not compatible.
    None,
    /// Compatible only after re-typing the argument with the declared type
    /// as a hint (an integer literal read as a float).
    Promotion,
    /// A one-directional implicit coercion exists (`int` to `float`).
    ImplicitCast,
    /// Equal once aliases are resolved.
    Same,
    /// Identical types.
    Equals,
}

impl TypeMatch {
    pub fn is_match(self) -> bool {
        self != TypeMatch::None
    }

    /// Tier of `actual` used where `declared` is expected, without hints.
    ///
    /// Never returns `Promotion`; that tier needs a converter that can
    /// re-type the argument expression, see the resolver's query converter.
    pub fn of(actual: &Type, declared: &Type) -> TypeMatch {
        if actual.is_error() || declared.is_error() {
            return TypeMatch::None;
        }
        if actual == declared {
            return TypeMatch::Equals;
        }
        let actual = actual.resolve_aliases();
        let declared = declared.resolve_aliases();
        if actual == declared {
            TypeMatch::Same
        } else if implicit_cast(&actual, &declared) {
            TypeMatch::ImplicitCast
        } else {
            TypeMatch::None
        }
    }
}

impl fmt::Display for TypeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeMatch::None => "none",
            TypeMatch::Promotion => "promotion",
            TypeMatch::ImplicitCast => "implicit cast",
            TypeMatch::Same => "same",
            TypeMatch::Equals => "equals",
        })
    }
}

/// Whether a value of type `from` converts to `to` without an explicit cast.
///
/// Both sides are expected to have aliases resolved.
pub fn implicit_cast(from: &Type, to: &Type) -> bool {
    matches!((from, to), (Type::Int, Type::Float) | (Type::Char, Type::Str))
}

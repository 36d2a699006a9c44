//! Core type definitions.

use std::fmt;

use crate::flags::TypeFlags;

/// Semantic type of a value, parameter or return.
///
/// Types are plain values compared structurally; the resolver builds them
/// from written `TypeExpr`s against its struct and alias tables.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub enum Type {
    // ===== Primitives =====
    Int,
    Float,
    Bool,
    /// `string`
    Str,
    Char,
    /// No value (functions without `-> T`).
    Void,
    /// Error recovery; never matches anything.
    Error,

    // ===== Compound types =====
    /// Struct type, possibly applied: `Pair<int, float>`.
    Named { name: String, args: Vec<Type> },
    /// `[T]`
    Array(Box<Type>),
    /// Type parameter of a generic declaration.
    Param(String),
    /// A named alias; compares `Same` (not `Equals`) to its target.
    Alias { name: String, target: Box<Type> },
}

impl Type {
    pub fn named(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Named {
            name: name.into(),
            args,
        }
    }

    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    pub fn param(name: impl Into<String>) -> Self {
        Type::Param(name.into())
    }

    pub fn alias(name: impl Into<String>, target: Type) -> Self {
        Type::Alias {
            name: name.into(),
            target: Box::new(target),
        }
    }

    /// Map a primitive type name to its type.
    pub fn primitive(name: &str) -> Option<Type> {
        Some(match name {
            "int" => Type::Int,
            "float" => Type::Float,
            "bool" => Type::Bool,
            "string" => Type::Str,
            "char" => Type::Char,
            "void" => Type::Void,
            _ => return None,
        })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Int | Type::Float | Type::Bool | Type::Str | Type::Char | Type::Void
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.resolve_aliases(), Type::Int | Type::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Element type of an array (looking through aliases).
    pub fn array_elem(&self) -> Option<Type> {
        match self.resolve_aliases() {
            Type::Array(elem) => Some(*elem),
            _ => None,
        }
    }

    /// The same type with every alias replaced by its target, recursively.
    pub fn resolve_aliases(&self) -> Type {
        if !self.flags().contains(TypeFlags::HAS_ALIAS) {
            return self.clone();
        }
        match self {
            Type::Alias { target, .. } => target.resolve_aliases(),
            Type::Array(elem) => Type::array(elem.resolve_aliases()),
            Type::Named { name, args } => Type::Named {
                name: name.clone(),
                args: args.iter().map(Type::resolve_aliases).collect(),
            },
            other => other.clone(),
        }
    }

    /// Properties of this type, computed by one traversal.
    pub fn flags(&self) -> TypeFlags {
        match self {
            Type::Int | Type::Float | Type::Bool | Type::Str | Type::Char | Type::Void => {
                TypeFlags::IS_PRIMITIVE
            }
            Type::Error => TypeFlags::HAS_ERROR,
            Type::Param(_) => TypeFlags::HAS_PARAM,
            Type::Array(elem) => elem.flags() & TypeFlags::PRESENCE,
            Type::Named { args, .. } => args
                .iter()
                .fold(TypeFlags::IS_NAMED, |acc, arg| {
                    acc | (arg.flags() & TypeFlags::PRESENCE)
                }),
            Type::Alias { target, .. } => {
                TypeFlags::HAS_ALIAS | (target.flags() & TypeFlags::PRESENCE)
            }
        }
    }

    /// Whether this type mentions a type parameter anywhere.
    pub fn has_params(&self) -> bool {
        self.flags().contains(TypeFlags::HAS_PARAM)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Float => f.write_str("float"),
            Type::Bool => f.write_str("bool"),
            Type::Str => f.write_str("string"),
            Type::Char => f.write_str("char"),
            Type::Void => f.write_str("void"),
            Type::Error => f.write_str("<error>"),
            Type::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::Array(elem) => write!(f, "[{elem}]"),
            Type::Param(name) | Type::Alias { name, .. } => f.write_str(name),
        }
    }
}

//! Builtin functions and operators.
//!
//! Builtins join the user declarations in the candidate pools. Parameters
//! that accept a family of types (`print` accepts anything) use an
//! [`Acceptor`] instead of a declared type.

use std::sync::Arc;

use brine_types::Type;

use crate::function::{Acceptor, Function, FunctionKind, Parameter};

const ARITHMETIC: [&str; 4] = ["+", "-", "*", "/"];
const ORDERING: [&str; 4] = ["<", ">", "<=", ">="];
const EQUALITY: [&str; 2] = ["==", "!="];

pub struct Builtins {
    pub functions: Vec<Arc<Function>>,
    pub operators: Vec<Arc<Function>>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        Builtins {
            functions: functions(),
            operators: operators(),
        }
    }
}

fn value() -> Acceptor {
    Acceptor::new("any value", |ty| {
        !matches!(ty.resolve_aliases(), Type::Void | Type::Error)
    })
}

fn sized() -> Acceptor {
    Acceptor::new("array or string", |ty| {
        matches!(ty.resolve_aliases(), Type::Array(_) | Type::Str)
    })
}

fn primitive() -> Acceptor {
    Acceptor::new("primitive", |ty| {
        let ty = ty.resolve_aliases();
        ty.is_primitive() && ty != Type::Void
    })
}

fn functions() -> Vec<Arc<Function>> {
    let builtin = |name: &str, param: Acceptor, ret: Type| {
        Arc::new(Function::builtin(
            name,
            FunctionKind::Function,
            vec![Parameter::accepting("value", param)],
            ret,
        ))
    };
    vec![
        builtin("print", value(), Type::Void),
        builtin("len", sized(), Type::Int),
        builtin("str", primitive(), Type::Str),
    ]
}

fn binary(symbol: &str, operand: &Type, ret: Type) -> Arc<Function> {
    Arc::new(Function::builtin(
        symbol,
        FunctionKind::Operator,
        vec![
            Parameter::new("lhs", operand.clone()),
            Parameter::new("rhs", operand.clone()),
        ],
        ret,
    ))
}

fn operators() -> Vec<Arc<Function>> {
    let mut ops = Vec::new();
    for numeric in [Type::Int, Type::Float] {
        for symbol in ARITHMETIC {
            ops.push(binary(symbol, &numeric, numeric.clone()));
        }
        for symbol in ORDERING {
            ops.push(binary(symbol, &numeric, Type::Bool));
        }
    }
    ops.push(binary("+", &Type::Str, Type::Str));
    for operand in [Type::Int, Type::Float, Type::Bool, Type::Str, Type::Char] {
        for symbol in EQUALITY {
            ops.push(binary(symbol, &operand, Type::Bool));
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolve;
    use crate::query::FunctionQuery;
    use crate::template::TemplateCache;

    fn ret_of(pool: &[Arc<Function>], name: &str, args: &[Type]) -> Option<Type> {
        let query = FunctionQuery::new(name).with_types(args);
        resolve(pool, "operator", &query, &mut TemplateCache::new())
            .ok()
            .map(|r| r.function.ret.clone())
    }

    #[test]
    fn test_mixed_arithmetic_widens_to_float() {
        let ops = Builtins::new().operators;
        assert_eq!(ret_of(&ops, "+", &[Type::Int, Type::Int]), Some(Type::Int));
        assert_eq!(ret_of(&ops, "+", &[Type::Int, Type::Float]), Some(Type::Float));
        assert_eq!(ret_of(&ops, "<", &[Type::Float, Type::Int]), Some(Type::Bool));
        assert_eq!(ret_of(&ops, "+", &[Type::Str, Type::Str]), Some(Type::Str));
        assert_eq!(ret_of(&ops, "-", &[Type::Str, Type::Str]), None);
    }

    #[test]
    fn test_acceptors() {
        assert!(value().accepts(&Type::named("Point", vec![])));
        assert!(!value().accepts(&Type::Void));
        assert!(sized().accepts(&Type::alias("Text", Type::Str)));
        assert!(!sized().accepts(&Type::Int));
        assert!(primitive().accepts(&Type::Char));
        assert!(!primitive().accepts(&Type::array(Type::Int)));
    }
}

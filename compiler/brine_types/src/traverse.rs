//! Type traversal.
//!
//! `TypeFolder` rebuilds a type bottom-up; override the `fold_*` method for
//! the variant you care about and let the defaults recurse.

use crate::{Type, TypeArgs, TypeFlags};

pub trait TypeFolder {
    fn fold(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Param(name) => self.fold_param(name),
            Type::Named { name, args } => self.fold_named(name, args),
            Type::Array(elem) => self.fold_array(elem),
            Type::Alias { name, target } => self.fold_alias(name, target),
            Type::Int
            | Type::Float
            | Type::Bool
            | Type::Str
            | Type::Char
            | Type::Void
            | Type::Error => ty.clone(),
        }
    }

    fn fold_param(&mut self, name: &str) -> Type {
        Type::Param(name.to_string())
    }

    fn fold_named(&mut self, name: &str, args: &[Type]) -> Type {
        Type::Named {
            name: name.to_string(),
            args: args.iter().map(|a| self.fold(a)).collect(),
        }
    }

    fn fold_array(&mut self, elem: &Type) -> Type {
        Type::Array(Box::new(self.fold(elem)))
    }

    fn fold_alias(&mut self, name: &str, target: &Type) -> Type {
        Type::Alias {
            name: name.to_string(),
            target: Box::new(self.fold(target)),
        }
    }
}

/// Replaces bound type parameters; unbound ones are kept.
pub struct Substitutor<'a> {
    args: &'a TypeArgs,
}

impl<'a> Substitutor<'a> {
    pub fn new(args: &'a TypeArgs) -> Self {
        Substitutor { args }
    }
}

impl TypeFolder for Substitutor<'_> {
    fn fold(&mut self, ty: &Type) -> Type {
        if !ty.flags().contains(TypeFlags::HAS_PARAM) {
            return ty.clone();
        }
        match ty {
            Type::Param(name) => self.fold_param(name),
            Type::Named { name, args } => self.fold_named(name, args),
            Type::Array(elem) => self.fold_array(elem),
            Type::Alias { name, target } => self.fold_alias(name, target),
            other => other.clone(),
        }
    }

    fn fold_param(&mut self, name: &str) -> Type {
        self.args
            .get(name)
            .cloned()
            .unwrap_or_else(|| Type::Param(name.to_string()))
    }
}

/// Substitute `args` into `ty`.
pub fn substitute(ty: &Type, args: &TypeArgs) -> Type {
    Substitutor::new(args).fold(ty)
}

/// Collect the names of every type parameter mentioned in `ty`, in order of
/// first appearance.
pub fn collect_params(ty: &Type, out: &mut Vec<String>) {
    match ty {
        Type::Param(name) => {
            if !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        Type::Named { args, .. } => {
            for arg in args {
                collect_params(arg, out);
            }
        }
        Type::Array(elem) => collect_params(elem, out),
        Type::Alias { target, .. } => collect_params(target, out),
        _ => {}
    }
}

//! Per-body checking state.

use std::collections::BTreeSet;
use std::sync::Arc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use brine_types::{Type, TypeArgs};

use crate::function::Function;

bitflags! {
    /// How a body is being checked.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u8 {
        /// Body of a generic declaration, checked before instantiation.
        /// Calls whose arguments still mention type parameters are skipped.
        const GENERIC_TEMPLATE = 1 << 0;
        /// The top-level statements of a file.
        const TOP_LEVEL = 1 << 1;
        /// An `extern` function with a body: no generic calls allowed.
        const INTEROP_RESTRICTED = 1 << 2;
    }
}

/// A local binding.
#[derive(Clone, Debug, PartialEq)]
pub struct Local {
    pub ty: Type,
    /// Declared at file level rather than inside a body.
    pub global: bool,
}

/// State for checking one function body or one file's statements.
#[derive(Debug)]
pub struct CompiledFrame {
    /// `None` for top-level statements.
    pub function: Option<Arc<Function>>,
    /// Bindings of the instantiation being checked.
    pub type_args: Option<TypeArgs>,
    pub type_params: Vec<String>,
    pub expected_return: Type,
    pub flags: FrameFlags,
    /// Enclosing loops, innermost last; `None` for unlabeled loops.
    labels: SmallVec<[Option<String>; 4]>,
    scopes: Vec<FxHashMap<String, Local>>,
    /// Globals referenced from inside a function body.
    pub captures: BTreeSet<String>,
}

impl CompiledFrame {
    /// Frame for a file's top-level statements.
    pub fn top_level() -> Self {
        CompiledFrame {
            function: None,
            type_args: None,
            type_params: Vec::new(),
            expected_return: Type::Void,
            flags: FrameFlags::TOP_LEVEL,
            labels: SmallVec::new(),
            scopes: vec![FxHashMap::default()],
            captures: BTreeSet::new(),
        }
    }

    /// Frame for the body of `function`, with its parameters bound.
    pub fn for_function(function: &Arc<Function>, flags: FrameFlags) -> Self {
        let mut params = FxHashMap::default();
        for param in &function.params {
            if let Some(ty) = param.ty.declared() {
                params.insert(
                    param.name.clone(),
                    Local {
                        ty: ty.clone(),
                        global: false,
                    },
                );
            }
        }
        CompiledFrame {
            function: Some(Arc::clone(function)),
            type_args: function.type_args.clone(),
            type_params: function.type_params.clone(),
            expected_return: function.ret.clone(),
            flags,
            labels: SmallVec::new(),
            scopes: vec![params],
            captures: BTreeSet::new(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.flags.contains(FrameFlags::TOP_LEVEL)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        // The outermost scope holds the parameters and is never popped.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost scope, shadowing earlier bindings.
    pub fn declare(&mut self, name: impl Into<String>, ty: Type) {
        let global = self.is_top_level() && self.scopes.len() == 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), Local { ty, global });
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Local> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// File-level bindings declared in this frame.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.scopes
            .first()
            .into_iter()
            .flatten()
            .filter(|(_, local)| local.global)
            .map(|(name, local)| (name.as_str(), &local.ty))
    }

    pub fn push_loop(&mut self, label: Option<String>) {
        self.labels.push(label);
    }

    pub fn pop_loop(&mut self) {
        self.labels.pop();
    }

    pub fn in_loop(&self) -> bool {
        !self.labels.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().flatten().any(|l| l == label)
    }

    /// Labels of enclosing loops, innermost first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().rev().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{FunctionKind, Parameter};

    #[test]
    fn test_scopes_shadow_and_unwind() {
        let f = Arc::new(Function::builtin(
            "f",
            FunctionKind::Function,
            vec![Parameter::new("x", Type::Int)],
            Type::Void,
        ));
        let mut frame = CompiledFrame::for_function(&f, FrameFlags::empty());
        frame.push_scope();
        frame.declare("x", Type::Str);
        assert_eq!(frame.lookup("x").map(|l| &l.ty), Some(&Type::Str));
        frame.pop_scope();
        assert_eq!(frame.lookup("x").map(|l| &l.ty), Some(&Type::Int));
        frame.pop_scope();
        assert!(frame.lookup("x").is_some());
    }

    #[test]
    fn test_top_level_bindings_are_global() {
        let mut frame = CompiledFrame::top_level();
        frame.declare("g", Type::Int);
        frame.push_scope();
        frame.declare("l", Type::Int);
        assert!(frame.lookup("g").is_some_and(|l| l.global));
        assert!(frame.lookup("l").is_some_and(|l| !l.global));
    }

    #[test]
    fn test_labels_innermost_first() {
        let mut frame = CompiledFrame::top_level();
        frame.push_loop(Some("outer".into()));
        frame.push_loop(None);
        frame.push_loop(Some("inner".into()));
        assert_eq!(frame.labels().collect::<Vec<_>>(), vec!["inner", "outer"]);
        assert!(frame.has_label("outer"));
        frame.pop_loop();
        frame.pop_loop();
        frame.pop_loop();
        assert!(!frame.in_loop());
    }
}

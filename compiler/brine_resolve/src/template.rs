//! Memoized instantiation of generic functions.
//!
//! The cache is owned by one compilation and passed by reference into
//! resolution; it is never global. Each (template, type arguments) pair is
//! instantiated at most once, so repeated requests return the same
//! `Arc<Function>`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use brine_types::TypeArgs;

use crate::function::Function;

/// A generic function together with one concrete instantiation.
#[derive(Debug)]
pub struct CompliableTemplate {
    pub original: Arc<Function>,
    pub instance: Arc<Function>,
    pub args: TypeArgs,
}

/// Identity of a template allocation. The cache keeps every template it
/// has seen alive, so addresses are never reused while keys exist.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
struct TemplateId(usize);

impl TemplateId {
    fn of(template: &Arc<Function>) -> Self {
        TemplateId(Arc::as_ptr(template) as usize)
    }
}

#[derive(Default, Debug)]
pub struct TemplateCache {
    index: FxHashMap<(TemplateId, TypeArgs), usize>,
    entries: Vec<Arc<CompliableTemplate>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        template: &Arc<Function>,
        args: &TypeArgs,
    ) -> Option<&Arc<CompliableTemplate>> {
        self.index
            .get(&(TemplateId::of(template), args.clone()))
            .map(|&i| &self.entries[i])
    }

    /// The cached instantiation, or a new one. The flag is `true` when the
    /// instantiation was created by this call.
    pub fn get_or_instantiate(
        &mut self,
        template: &Arc<Function>,
        args: &TypeArgs,
    ) -> (Arc<CompliableTemplate>, bool) {
        let key = (TemplateId::of(template), args.clone());
        if let Some(&i) = self.index.get(&key) {
            return (Arc::clone(&self.entries[i]), false);
        }

        tracing::debug!(template = %template.signature(), %args, "instantiating");
        let entry = Arc::new(CompliableTemplate {
            original: Arc::clone(template),
            instance: Arc::new(template.instantiate(args)),
            args: args.clone(),
        });
        self.index.insert(key, self.entries.len());
        self.entries.push(Arc::clone(&entry));
        (entry, true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Instantiations in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<CompliableTemplate>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{FunctionKind, Parameter};
    use brine_types::Type;

    fn identity() -> Arc<Function> {
        let mut f = Function::builtin(
            "id",
            FunctionKind::Function,
            vec![Parameter::new("x", Type::param("T"))],
            Type::param("T"),
        );
        f.type_params = vec!["T".into()];
        Arc::new(f)
    }

    #[test]
    fn test_equal_args_share_one_instantiation() {
        let id = identity();
        let args: TypeArgs = [("T", Type::Int)].into_iter().collect();
        let mut cache = TemplateCache::new();

        let (first, created) = cache.get_or_instantiate(&id, &args);
        assert!(created);
        let (second, created) = cache.get_or_instantiate(&id, &args.clone());
        assert!(!created);
        assert!(Arc::ptr_eq(&first.instance, &second.instance));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_args_or_templates_instantiate_separately() {
        let id = identity();
        let other = identity();
        let ints: TypeArgs = [("T", Type::Int)].into_iter().collect();
        let strs: TypeArgs = [("T", Type::Str)].into_iter().collect();
        let mut cache = TemplateCache::new();

        let (a, _) = cache.get_or_instantiate(&id, &ints);
        let (b, _) = cache.get_or_instantiate(&id, &strs);
        let (c, _) = cache.get_or_instantiate(&other, &ints);
        assert!(!Arc::ptr_eq(&a.instance, &b.instance));
        assert!(!Arc::ptr_eq(&a.instance, &c.instance));
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&id, &strs).is_some());
        assert_eq!(b.instance.ret, Type::Str);
    }
}

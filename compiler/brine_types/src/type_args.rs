//! Type-argument maps for generic declarations.

use std::collections::BTreeMap;
use std::fmt;

use crate::Type;

/// Binding of type parameter names to concrete types.
///
/// Ordered by parameter name so equal maps hash and print identically,
/// which makes them usable as part of a template cache key.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeArgs(BTreeMap<String, Type>);

impl TypeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: &str) -> Option<&Type> {
        self.0.get(param)
    }

    /// Bind `param`, returning the previous binding if any.
    pub fn insert(&mut self, param: impl Into<String>, ty: Type) -> Option<Type> {
        self.0.insert(param.into(), ty)
    }

    pub fn contains(&self, param: &str) -> bool {
        self.0.contains_key(param)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether every name in `params` is bound.
    pub fn covers<'a>(&self, mut params: impl Iterator<Item = &'a str>) -> bool {
        params.all(|p| self.contains(p))
    }
}

impl<K: Into<String>> FromIterator<(K, Type)> for TypeArgs {
    fn from_iter<I: IntoIterator<Item = (K, Type)>>(iter: I) -> Self {
        TypeArgs(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for TypeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, (name, ty)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {ty}")?;
        }
        f.write_str(">")
    }
}

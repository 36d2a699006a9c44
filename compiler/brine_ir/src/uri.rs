//! File identity.
//!
//! A [`FileUri`] names one concrete, resolved source file. Two `using`
//! directives that end up at the same file produce equal URIs, which is what
//! the source loader deduplicates on.
//!
//! URIs have the shape `scheme:rest`. Filesystem files use `file:` followed by
//! an absolute, normalized path; other backends pick their own scheme
//! (`std:core`, `mem:scratch.br`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scheme used for files on the local filesystem.
pub const FILE_SCHEME: &str = "file";

/// Resolved identity of a source file.
///
/// Cheap to clone (reference-counted string).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileUri(Arc<str>);

impl FileUri {
    /// Create a URI from its textual form.
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        FileUri(uri.into())
    }

    /// Create a URI from a scheme and the scheme-specific part.
    pub fn from_parts(scheme: &str, rest: &str) -> Self {
        FileUri(format!("{scheme}:{rest}").into())
    }

    /// Create a `file:` URI for a filesystem path.
    ///
    /// The path is used as given; callers normalize it first.
    pub fn from_path(path: &Path) -> Self {
        Self::from_parts(FILE_SCHEME, &path.to_string_lossy())
    }

    /// The full textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme, if the URI has one.
    ///
    /// Single-letter prefixes are not schemes (`C:\src` is a path).
    pub fn scheme(&self) -> Option<&str> {
        split_scheme(&self.0).map(|(scheme, _)| scheme)
    }

    /// The part after `scheme:`, or the whole string when there is no scheme.
    pub fn rest(&self) -> &str {
        split_scheme(&self.0).map_or(&self.0, |(_, rest)| rest)
    }

    /// The filesystem path for `file:` URIs.
    pub fn to_path(&self) -> Option<PathBuf> {
        match split_scheme(&self.0) {
            Some((FILE_SCHEME, rest)) => Some(PathBuf::from(rest)),
            _ => None,
        }
    }

    /// Last path segment, used for short display names.
    pub fn file_name(&self) -> &str {
        let rest = self.rest();
        rest.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(rest)
    }
}

/// Split `scheme:rest`, rejecting one-letter schemes and non-alphanumeric ones.
pub fn split_scheme(text: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = text.split_once(':')?;
    let valid = scheme.len() > 1
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
    valid.then_some((scheme, rest))
}

impl fmt::Debug for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileUri({})", self.0)
    }
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileUri {
    fn from(value: &str) -> Self {
        FileUri::new(value)
    }
}

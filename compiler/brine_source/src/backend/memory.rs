//! In-memory backend for interactive sessions and tests.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use brine_ir::FileUri;

use super::{scheme_local_name, ContentStream, FetchError, LoadOutcome, SourceBackend};

/// Scheme of in-memory files.
pub const MEMORY_SCHEME: &str = "mem";

/// Mutable set of in-memory files, addressed as `mem:name`.
///
/// Clones share the same files, so a session can keep a handle and edit
/// files between compilations. A name without extension also matches the
/// same name with `.br` appended.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    files: Arc<RwLock<FxHashMap<String, Arc<str>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. Returns its URI.
    pub fn insert(&self, name: impl Into<String>, text: impl Into<Arc<str>>) -> FileUri {
        let name = name.into();
        let uri = FileUri::from_parts(MEMORY_SCHEME, &name);
        self.files.write().insert(name, text.into());
        uri
    }

    pub fn remove(&self, name: &str) -> bool {
        self.files.write().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// The stored name `requested` refers to, if any.
    fn lookup(&self, requested: &str) -> Option<String> {
        let files = self.files.read();
        if files.contains_key(requested) {
            return Some(requested.to_string());
        }
        let with_ext = format!("{requested}.br");
        files.contains_key(&with_ext).then_some(with_ext)
    }
}

impl SourceBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        let Some(name) = scheme_local_name(MEMORY_SCHEME, requested, current) else {
            return LoadOutcome::NextHandler;
        };
        let Some(stored) = self.lookup(name) else {
            return LoadOutcome::NotFound {
                uri: FileUri::from_parts(MEMORY_SCHEME, name),
            };
        };
        let uri = FileUri::from_parts(MEMORY_SCHEME, &stored);
        let files = Arc::clone(&self.files);
        LoadOutcome::Success {
            uri,
            content: ContentStream::Deferred(Box::new(move || {
                files
                    .read()
                    .get(&stored)
                    .map(|text| text.to_string())
                    .ok_or(FetchError::Vanished(stored))
            })),
        }
    }
}

//! Embedded bundle backend.

use rustc_hash::FxHashMap;

use brine_ir::FileUri;

use super::{scheme_local_name, ContentStream, FetchError, LoadOutcome, SourceBackend};

/// Static files compiled into the binary, addressed as `scheme:name`.
///
/// A `.br` suffix on the requested name is ignored, so `std:core` and
/// `std:core.br` are the same file.
#[derive(Clone, Debug, Default)]
pub struct BundleBackend {
    scheme: String,
    files: FxHashMap<String, &'static str>,
}

impl BundleBackend {
    pub fn new(scheme: impl Into<String>) -> Self {
        BundleBackend {
            scheme: scheme.into(),
            files: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_file(mut self, name: &str, content: &'static str) -> Self {
        self.files.insert(normalize(name).to_string(), content);
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn normalize(name: &str) -> &str {
    name.strip_suffix(".br").unwrap_or(name)
}

impl SourceBackend for BundleBackend {
    fn name(&self) -> &str {
        "bundle"
    }

    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        let Some(name) = scheme_local_name(&self.scheme, requested, current) else {
            return LoadOutcome::NextHandler;
        };
        let name = normalize(name);
        let uri = FileUri::from_parts(&self.scheme, name);
        match self.files.get(name) {
            Some(&text) => LoadOutcome::Success {
                uri,
                content: ContentStream::Deferred(Box::new(move || -> Result<String, FetchError> {
                    Ok(text.to_string())
                })),
            },
            // Bare sibling names fall through so local files can still match.
            None if brine_ir::split_scheme(requested).is_none() => LoadOutcome::NextHandler,
            None => LoadOutcome::NotFound { uri },
        }
    }
}

//! Local filesystem backend.

use std::path::{Path, PathBuf};

use brine_ir::{split_scheme, FileUri, FILE_SCHEME};

use super::{ContentStream, FetchError, LoadOutcome, SourceBackend};

/// Extension appended to import paths written without one.
pub const SOURCE_EXTENSION: &str = "br";

/// Environment variable holding extra search roots.
const PATH_ENV: &str = "BRINE_PATH";

/// Resolves paths against the importing file's directory, then against each
/// configured root in order.
///
/// Resolved files are identified by their canonical path, so `a/../b.br` and
/// `b.br` are the same file.
#[derive(Clone, Debug, Default)]
pub struct FileSystemBackend {
    roots: Vec<PathBuf>,
}

impl FileSystemBackend {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        FileSystemBackend { roots }
    }

    /// Roots taken from `BRINE_PATH` (platform path-list syntax) followed by
    /// `extra`.
    pub fn from_env(extra: Vec<PathBuf>) -> Self {
        let mut roots: Vec<PathBuf> = std::env::var_os(PATH_ENV)
            .map(|value| std::env::split_paths(&value).collect())
            .unwrap_or_default();
        roots.extend(extra);
        tracing::debug!(?roots, "filesystem search roots");
        FileSystemBackend { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Candidate paths for `requested`, most specific first.
    fn candidates(&self, path: &Path, current: Option<&FileUri>) -> Vec<PathBuf> {
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }
        let mut out = Vec::with_capacity(self.roots.len() + 1);
        match current.and_then(FileUri::to_path) {
            Some(current) => {
                let dir = current.parent().unwrap_or(Path::new("."));
                out.push(dir.join(path));
            }
            None if current.is_none() => out.push(path.to_path_buf()),
            None => {}
        }
        out.extend(self.roots.iter().map(|root| root.join(path)));
        out
    }

    fn resolve(&self, requested: &str, current: Option<&FileUri>) -> Result<PathBuf, LoadOutcome> {
        let raw = match split_scheme(requested) {
            Some((FILE_SCHEME, rest)) => rest,
            Some(_) => return Err(LoadOutcome::NextHandler),
            None => requested,
        };
        let mut path = PathBuf::from(raw);
        if path.extension().is_none() {
            path.set_extension(SOURCE_EXTENSION);
        }

        let candidates = self.candidates(&path, current);
        for candidate in &candidates {
            if candidate.is_file() {
                let canonical = candidate
                    .canonicalize()
                    .unwrap_or_else(|_| candidate.clone());
                return Ok(canonical);
            }
        }
        let shown = candidates.into_iter().next().unwrap_or(path);
        Err(LoadOutcome::NotFound {
            uri: FileUri::from_path(&shown),
        })
    }
}

impl SourceBackend for FileSystemBackend {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        let path = match self.resolve(requested, current) {
            Ok(path) => path,
            Err(outcome) => return outcome,
        };
        let uri = FileUri::from_path(&path);
        LoadOutcome::Success {
            uri,
            content: ContentStream::Deferred(Box::new(move || {
                std::fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
            })),
        }
    }
}

//! Source backends.
//!
//! A backend answers "do you have this file?" for an import path. The loader
//! asks each configured backend in order until one succeeds:
//!
//! | outcome       | loader reaction                                         |
//! |---------------|---------------------------------------------------------|
//! | `Success`     | stop; fetch and parse unless the file was seen before   |
//! | `NotFound`    | remember the path was recognized, try the next backend  |
//! | `Error`       | stop; report the message at the importing directive     |
//! | `NextHandler` | try the next backend                                    |

mod bundle;
mod fs;
mod memory;

pub use bundle::BundleBackend;
pub use fs::{FileSystemBackend, SOURCE_EXTENSION};
pub use memory::{MemoryBackend, MEMORY_SCHEME};

use std::fmt;
use std::io;
use std::path::PathBuf;

use brine_ir::FileUri;

/// Why fetching file content failed after a backend accepted the path.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{0}` was removed before it could be read")]
    Vanished(String),

    #[error("the worker fetching `{0}` stopped without a result")]
    WorkerLost(FileUri),
}

impl FetchError {
    /// Whether this failure means the file does not exist (rather than an
    /// I/O problem with a file that does).
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            FetchError::Vanished(_) => true,
            FetchError::WorkerLost(_) => false,
        }
    }
}

/// Deferred content fetch, run on a worker thread.
pub type DeferredFetch = Box<dyn FnOnce() -> Result<String, FetchError> + Send + 'static>;

/// File content as handed out by a backend.
pub enum ContentStream {
    /// Content is already in memory.
    Ready(String),
    /// Content must still be fetched.
    Deferred(DeferredFetch),
    /// The backend accepted the path but has nothing to read. Always a
    /// backend bug; the loader reports it as an internal error.
    Missing,
}

impl ContentStream {
    /// Fetch the content on the current thread.
    pub fn read_now(self) -> Option<Result<String, FetchError>> {
        match self {
            ContentStream::Ready(text) => Some(Ok(text)),
            ContentStream::Deferred(fetch) => Some(fetch()),
            ContentStream::Missing => None,
        }
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStream::Ready(text) => write!(f, "Ready({} bytes)", text.len()),
            ContentStream::Deferred(_) => f.write_str("Deferred"),
            ContentStream::Missing => f.write_str("Missing"),
        }
    }
}

/// A backend's answer to one import request.
#[derive(Debug)]
pub enum LoadOutcome {
    Success { uri: FileUri, content: ContentStream },
    NotFound { uri: FileUri },
    Error { uri: FileUri, message: String },
    NextHandler,
}

/// A pluggable source of files.
///
/// `requested` is the path exactly as written in the `using` directive (or on
/// the command line); `current` is the file containing that directive.
pub trait SourceBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Resolve `requested` to a file identity.
    ///
    /// Content that costs anything to produce should come back as
    /// [`ContentStream::Deferred`]: the loader only runs the fetch after
    /// checking the identity was not loaded before, so an already visited
    /// file is never read twice.
    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome;

    /// Resolve for a loader that runs fetches on worker threads.
    ///
    /// The returned fetch may run on another thread, concurrently with
    /// other fetches of this backend.
    fn try_load_deferred(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        self.try_load(requested, current)
    }
}

/// Split an import path into a lookup name for a scheme-based backend.
///
/// `scheme:name` yields `name` when the scheme matches. A path without a
/// scheme yields itself when the importing file lives under the same scheme,
/// so files inside a bundle can import their siblings by bare name.
pub(crate) fn scheme_local_name<'a>(
    scheme: &str,
    requested: &'a str,
    current: Option<&FileUri>,
) -> Option<&'a str> {
    match brine_ir::split_scheme(requested) {
        Some((s, rest)) => (s == scheme).then_some(rest),
        None => current
            .and_then(FileUri::scheme)
            .filter(|s| *s == scheme)
            .map(|_| requested),
    }
}

#[cfg(test)]
mod tests;

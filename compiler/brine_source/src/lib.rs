//! Source loading for brine.
//!
//! Given an entry path, finds, fetches, tokenizes and parses every file
//! reachable through `using` directives, each exactly once.
//!
//! - [`backend`]: pluggable file sources (file system, bundled, in-memory)
//! - [`FrontEnd`]: the tokenizer/parser pair the loader drives
//! - [`SourceLoader`] / [`collect`]: the import graph walk
//!
//! Loading problems are diagnostics, never panics: a missing import is
//! reported at the directive that asked for it and the walk continues.

pub mod backend;
mod front_end;
mod loader;

pub use backend::{
    BundleBackend, ContentStream, FetchError, FileSystemBackend, LoadOutcome, MemoryBackend,
    SourceBackend,
};
pub use front_end::{BrineFrontEnd, FrontEnd};
pub use loader::{
    collect, read_source, ImportSite, LoadMode, ParsedFile, SourceCollection, SourceLoader,
};

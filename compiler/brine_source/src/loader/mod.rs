//! The import graph walk.
//!
//! Starting from an entry file, every file reachable through `using`
//! directives is resolved, fetched, tokenized and parsed exactly once.
//!
//! # Algorithm
//!
//! ```text
//! request(entry)
//! loop:
//!   oldest := pending.pop_front()      // blocks if still in flight
//!   complete(oldest)                   // parse, request its imports
//!   for each pending fetch already finished:
//!     complete(it)                     // may push more pending fetches
//! until pending is empty
//! ```
//!
//! A resolved file identity enters the visited set the moment a backend
//! reports success, before its fetch is scheduled, so cycles and diamonds
//! resolve to an already-visited file and stop there.
//!
//! Parsing and all bookkeeping happen on the calling thread. In
//! [`LoadMode::Deferred`] only the content fetches run, on a pool of fetch
//! threads owned by the walk.

mod pending;

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use brine_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use brine_ir::{FileUri, SourceAst, Span, TokenList};
use brine_lexer::PreprocessorVars;

use crate::backend::{ContentStream, LoadOutcome, SourceBackend};
use crate::front_end::{BrineFrontEnd, FrontEnd};
use pending::{fetch_pool, Fetch, PendingFile};

/// The `using` directive that asked for a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSite {
    /// File containing the directive.
    pub file: FileUri,
    /// Location of the directive in that file.
    pub span: Span,
    /// The path as written.
    pub path: String,
}

/// One loaded and parsed file.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub uri: FileUri,
    /// The directive that first pulled this file in; `None` for the entry
    /// file and for additional imports.
    pub directive: Option<ImportSite>,
    pub source: Arc<str>,
    pub tokens: TokenList,
    /// Parsed tree; each `using` directive has its `resolved` slot filled
    /// when the path resolved.
    pub ast: SourceAst,
}

/// How content is fetched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Use `try_load`; deferred content is read inline.
    #[default]
    Blocking,
    /// Use `try_load_deferred`; deferred content is read on worker threads
    /// while already fetched files are parsed.
    Deferred,
}

/// Every file reachable from the entry, in parse order.
#[derive(Clone, Debug, Default)]
pub struct SourceCollection {
    pub files: Vec<ParsedFile>,
    /// Resolved identity of the entry file, if it resolved at all.
    pub entry: Option<FileUri>,
}

impl SourceCollection {
    pub fn get(&self, uri: &FileUri) -> Option<&ParsedFile> {
        self.files.iter().find(|f| &f.uri == uri)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedFile> {
        self.files.iter()
    }

    pub fn uris(&self) -> impl Iterator<Item = &FileUri> {
        self.files.iter().map(|f| &f.uri)
    }
}

static DEFAULT_FRONT_END: BrineFrontEnd = BrineFrontEnd;

/// Loader configuration: backends in priority order, preprocessor
/// variables, the front end and the fetch mode.
pub struct SourceLoader<'a> {
    backends: &'a [Box<dyn SourceBackend>],
    vars: &'a PreprocessorVars,
    front_end: &'a dyn FrontEnd,
    mode: LoadMode,
}

impl<'a> SourceLoader<'a> {
    pub fn new(backends: &'a [Box<dyn SourceBackend>], vars: &'a PreprocessorVars) -> Self {
        SourceLoader {
            backends,
            vars,
            front_end: &DEFAULT_FRONT_END,
            mode: LoadMode::default(),
        }
    }

    #[must_use]
    pub fn with_front_end(mut self, front_end: &'a dyn FrontEnd) -> Self {
        self.front_end = front_end;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Load `entry`, then each of `additional_imports` as if the entry file
    /// imported it, then everything they import.
    #[tracing::instrument(level = "debug", skip(self, additional_imports, diagnostics), fields(mode = ?self.mode))]
    pub fn collect(
        &self,
        entry: &str,
        additional_imports: &[String],
        diagnostics: &mut DiagnosticSink,
    ) -> SourceCollection {
        let mut walk = Walk {
            loader: self,
            diagnostics,
            entry: None,
            visited: FxHashSet::default(),
            pending: VecDeque::new(),
            files: Vec::new(),
            fetch_pool: match self.mode {
                LoadMode::Blocking => None,
                LoadMode::Deferred => fetch_pool(),
            },
        };

        walk.entry = walk.request(entry, None, None, true);
        let entry_uri = walk.entry.clone();
        for import in additional_imports {
            walk.request(import, None, entry_uri.as_ref(), false);
        }
        walk.drain();

        tracing::debug!(files = walk.files.len(), "source collection complete");
        SourceCollection {
            files: walk.files,
            entry: entry_uri,
        }
    }
}

/// Load every file reachable from `entry`.
pub fn collect(
    entry: &str,
    vars: &PreprocessorVars,
    additional_imports: &[String],
    backends: &[Box<dyn SourceBackend>],
    mode: LoadMode,
    diagnostics: &mut DiagnosticSink,
) -> SourceCollection {
    SourceLoader::new(backends, vars)
        .with_mode(mode)
        .collect(entry, additional_imports, diagnostics)
}

/// Resolve and read a single file without following its imports.
///
/// Backends are asked in order with their blocking variant; the first
/// success wins.
pub fn read_source(
    requested: &str,
    current: Option<&FileUri>,
    backends: &[Box<dyn SourceBackend>],
) -> Result<(FileUri, String), Diagnostic> {
    let mut recognized = None;
    for backend in backends {
        match backend.try_load(requested, current) {
            LoadOutcome::Success { uri, content } => {
                return match content.read_now() {
                    Some(Ok(text)) => Ok((uri, text)),
                    Some(Err(e)) => Err(Diagnostic::error(fetch_error_code(&e))
                        .with_message(format!("cannot load `{uri}`"))
                        .with_note(e.to_string())),
                    None => Err(missing_content(&uri, backend.name())),
                };
            }
            LoadOutcome::NotFound { uri } => {
                recognized.get_or_insert(uri);
            }
            LoadOutcome::Error { uri, message } => {
                return Err(backend_error(&uri, &message, false));
            }
            LoadOutcome::NextHandler => {}
        }
    }
    Err(unresolved(requested, recognized.as_ref(), backends, false))
}

/// State of one `collect` run.
struct Walk<'l, 'a> {
    loader: &'l SourceLoader<'a>,
    diagnostics: &'l mut DiagnosticSink,
    entry: Option<FileUri>,
    visited: FxHashSet<FileUri>,
    pending: VecDeque<PendingFile>,
    files: Vec<ParsedFile>,
    /// Present only for deferred walks.
    fetch_pool: Option<rayon::ThreadPool>,
}

impl Walk<'_, '_> {
    /// Resolve `path` through the backends and schedule its fetch.
    ///
    /// Returns the resolved identity (also for files that were already
    /// visited), or `None` after reporting why the path did not resolve.
    /// Failures of the entry file are critical.
    fn request(
        &mut self,
        path: &str,
        site: Option<ImportSite>,
        current: Option<&FileUri>,
        is_entry: bool,
    ) -> Option<FileUri> {
        let mut recognized = None;

        for backend in self.loader.backends {
            let outcome = match self.loader.mode {
                LoadMode::Blocking => backend.try_load(path, current),
                LoadMode::Deferred => backend.try_load_deferred(path, current),
            };
            match outcome {
                LoadOutcome::Success { uri, content } => {
                    tracing::trace!(backend = backend.name(), %uri, path, "resolved");
                    self.schedule(uri.clone(), site, content, backend.name());
                    return Some(uri);
                }
                LoadOutcome::NotFound { uri } => {
                    tracing::trace!(backend = backend.name(), %uri, path, "not found");
                    recognized.get_or_insert(uri);
                }
                LoadOutcome::Error { uri, message } => {
                    let diag = backend_error(&uri, &message, is_entry);
                    self.report(diag, site.as_ref());
                    return None;
                }
                LoadOutcome::NextHandler => {}
            }
        }

        let diag = unresolved(path, recognized.as_ref(), self.loader.backends, is_entry);
        self.report(diag, site.as_ref());
        None
    }

    fn schedule(
        &mut self,
        uri: FileUri,
        site: Option<ImportSite>,
        content: ContentStream,
        backend: &str,
    ) {
        if !self.visited.insert(uri.clone()) {
            tracing::trace!(%uri, "already visited");
            return;
        }
        let fetch = match content {
            ContentStream::Ready(text) => Fetch::Ready(Ok(text)),
            ContentStream::Deferred(fetch) => match &self.fetch_pool {
                Some(pool) => Fetch::spawn(pool, fetch),
                None => Fetch::Ready(fetch()),
            },
            ContentStream::Missing => {
                let diag = missing_content(&uri, backend);
                self.report(diag, site.as_ref());
                return;
            }
        };
        self.pending.push_back(PendingFile {
            target: uri,
            directive: site,
            fetch,
        });
    }

    /// Run until no fetch is pending.
    fn drain(&mut self) {
        while let Some(oldest) = self.pending.pop_front() {
            self.complete(oldest);

            // Everything that finished meanwhile, without blocking.
            let mut i = 0;
            while i < self.pending.len() {
                if self.pending[i].fetch.is_complete() {
                    if let Some(done) = self.pending.remove(i) {
                        self.complete(done);
                    }
                } else {
                    i += 1;
                }
            }
        }
    }

    fn complete(&mut self, file: PendingFile) {
        let PendingFile {
            target,
            directive,
            fetch,
        } = file;

        let text = match fetch.wait(&target) {
            Ok(text) => text,
            Err(e) => {
                let critical = self.entry.as_ref() == Some(&target);
                let diag = new_diagnostic(fetch_error_code(&e), critical)
                    .with_message(format!("cannot load `{target}`"))
                    .with_note(e.to_string());
                self.report(diag, directive.as_ref());
                return;
            }
        };

        let front_end = self.loader.front_end;
        let tokens = front_end.tokenize(&text, self.diagnostics, self.loader.vars, &target);
        let mut ast = front_end.parse(&tokens, &target, self.diagnostics);

        let mut imported_here: FxHashMap<FileUri, Span> = FxHashMap::default();
        for using in &mut ast.usings {
            let site = ImportSite {
                file: target.clone(),
                span: using.span,
                path: using.path.clone(),
            };
            using.resolved = self.request(&using.path, Some(site), Some(&target), false);

            if let Some(uri) = &using.resolved {
                if let Some(first) = imported_here.get(uri) {
                    self.diagnostics.push(
                        Diagnostic::warning(ErrorCode::W3001)
                            .with_message(format!("`{uri}` is imported more than once"))
                            .with_file(target.clone())
                            .with_label(using.span, "duplicate import")
                            .with_secondary_label(*first, "first imported here"),
                    );
                } else {
                    imported_here.insert(uri.clone(), using.span);
                }
            }
        }

        tracing::debug!(file = %target, usings = ast.usings.len(), "parsed");
        self.files.push(ParsedFile {
            uri: target,
            directive,
            source: text.into(),
            tokens,
            ast,
        });
    }

    /// Attach `diag` to the importing directive when there is one.
    fn report(&mut self, diag: Diagnostic, site: Option<&ImportSite>) {
        let diag = match site {
            Some(site) => diag
                .with_file(site.file.clone())
                .with_label(site.span, format!("imported as `{}`", site.path)),
            None => diag,
        };
        self.diagnostics.push(diag);
    }
}

fn new_diagnostic(code: ErrorCode, critical: bool) -> Diagnostic {
    if critical {
        Diagnostic::critical(code)
    } else {
        Diagnostic::error(code)
    }
}

fn fetch_error_code(error: &crate::backend::FetchError) -> ErrorCode {
    if error.is_not_found() {
        ErrorCode::E3001
    } else {
        ErrorCode::E3003
    }
}

#[cold]
fn unresolved(
    path: &str,
    recognized: Option<&FileUri>,
    backends: &[Box<dyn SourceBackend>],
    critical: bool,
) -> Diagnostic {
    match recognized {
        Some(uri) => new_diagnostic(ErrorCode::E3001, critical)
            .with_message(format!("file not found: `{path}`"))
            .with_note(format!("looked for `{uri}`")),
        None => {
            let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
            new_diagnostic(ErrorCode::E3002, critical)
                .with_message(format!("no source backend handles `{path}`"))
                .with_note(format!("configured backends: {}", names.join(", ")))
        }
    }
}

#[cold]
fn backend_error(uri: &FileUri, message: &str, critical: bool) -> Diagnostic {
    new_diagnostic(ErrorCode::E3003, critical)
        .with_message(format!("cannot load `{uri}`"))
        .with_note(message.to_string())
}

#[cold]
fn missing_content(uri: &FileUri, backend: &str) -> Diagnostic {
    Diagnostic::internal(ErrorCode::E9003)
        .with_message(format!(
            "backend `{backend}` resolved `{uri}` but supplied no content"
        ))
}

#[cfg(test)]
mod tests;

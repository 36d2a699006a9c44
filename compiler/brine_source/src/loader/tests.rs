use std::cell::RefCell;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use pretty_assertions::assert_eq;

use brine_diagnostic::{Severity, SinkConfig};

use super::*;
use crate::backend::{FetchError, FileSystemBackend, MemoryBackend};

/// Backend wrapper that counts how often content is actually fetched.
///
/// Content handed out ready counts at hand-out time, since it was read
/// before the loader could check whether it needs it.
struct CountingBackend<B> {
    inner: B,
    fetches: Arc<AtomicUsize>,
}

impl<B> CountingBackend<B> {
    fn new(inner: B) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inner,
            fetches: Arc::clone(&fetches),
        };
        (backend, fetches)
    }

    fn counted(&self, outcome: LoadOutcome) -> LoadOutcome {
        let (uri, content) = match outcome {
            LoadOutcome::Success { uri, content } => (uri, content),
            other => return other,
        };
        let content = match content {
            ContentStream::Deferred(fetch) => {
                let fetches = Arc::clone(&self.fetches);
                ContentStream::Deferred(Box::new(move || {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    fetch()
                }))
            }
            ContentStream::Ready(text) => {
                self.fetches.fetch_add(1, Ordering::SeqCst);
                ContentStream::Ready(text)
            }
            ContentStream::Missing => ContentStream::Missing,
        };
        LoadOutcome::Success { uri, content }
    }
}

impl<B: SourceBackend> SourceBackend for CountingBackend<B> {
    fn name(&self) -> &str {
        "counting"
    }

    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        self.counted(self.inner.try_load(requested, current))
    }

    fn try_load_deferred(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        self.counted(self.inner.try_load_deferred(requested, current))
    }
}

/// What a gated fetch waits for before reading, and whom it tells after.
#[derive(Default)]
struct Gate {
    wait_for: Option<Receiver<()>>,
    then_signal: Option<Sender<()>>,
}

/// Memory backend whose deferred fetches can be held back per file.
struct GatedBackend {
    inner: MemoryBackend,
    gates: FxHashMap<&'static str, Gate>,
}

impl SourceBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    fn try_load(&self, requested: &str, current: Option<&FileUri>) -> LoadOutcome {
        let (uri, fetch) = match self.inner.try_load(requested, current) {
            LoadOutcome::Success {
                uri,
                content: ContentStream::Deferred(fetch),
            } => (uri, fetch),
            other => return other,
        };
        let Some(gate) = self.gates.get(uri.as_str()) else {
            return LoadOutcome::Success {
                uri,
                content: ContentStream::Deferred(fetch),
            };
        };
        let wait_for = gate.wait_for.clone();
        let then_signal = gate.then_signal.clone();
        LoadOutcome::Success {
            uri,
            content: ContentStream::Deferred(Box::new(move || {
                if let Some(rx) = wait_for {
                    // Bounded so a broken ordering fails the test instead of hanging it.
                    let _ = rx.recv_timeout(GATE_TIMEOUT);
                }
                let result = fetch();
                if let Some(tx) = then_signal {
                    let _ = tx.send(());
                }
                result
            })),
        }
    }
}

const GATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Front end that runs a hook right before parsing particular files.
#[derive(Default)]
struct HookedFrontEnd {
    recorder: RecordingFrontEnd,
    before_parse: FxHashMap<FileUri, Box<dyn Fn()>>,
}

impl FrontEnd for HookedFrontEnd {
    fn tokenize(
        &self,
        text: &str,
        diagnostics: &mut DiagnosticSink,
        vars: &PreprocessorVars,
        file: &FileUri,
    ) -> TokenList {
        self.recorder.tokenize(text, diagnostics, vars, file)
    }

    fn parse(
        &self,
        tokens: &TokenList,
        file: &FileUri,
        diagnostics: &mut DiagnosticSink,
    ) -> SourceAst {
        if let Some(hook) = self.before_parse.get(file) {
            hook();
        }
        self.recorder.parse(tokens, file, diagnostics)
    }
}

/// Backend with a fixed answer for every path under its scheme.
struct FixedBackend {
    scheme: &'static str,
    answer: fn(FileUri) -> LoadOutcome,
}

impl SourceBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn try_load(&self, requested: &str, _current: Option<&FileUri>) -> LoadOutcome {
        match brine_ir::split_scheme(requested) {
            Some((scheme, _)) if scheme == self.scheme => (self.answer)(FileUri::new(requested)),
            _ => LoadOutcome::NextHandler,
        }
    }
}

/// Front end that records which files it parsed.
#[derive(Default)]
struct RecordingFrontEnd {
    parsed: RefCell<Vec<FileUri>>,
}

impl FrontEnd for RecordingFrontEnd {
    fn tokenize(
        &self,
        text: &str,
        diagnostics: &mut DiagnosticSink,
        vars: &PreprocessorVars,
        file: &FileUri,
    ) -> TokenList {
        BrineFrontEnd.tokenize(text, diagnostics, vars, file)
    }

    fn parse(
        &self,
        tokens: &TokenList,
        file: &FileUri,
        diagnostics: &mut DiagnosticSink,
    ) -> SourceAst {
        self.parsed.borrow_mut().push(file.clone());
        BrineFrontEnd.parse(tokens, file, diagnostics)
    }
}

fn memory(files: &[(&str, &str)]) -> MemoryBackend {
    let mem = MemoryBackend::new();
    for (name, text) in files {
        mem.insert(*name, *text);
    }
    mem
}

fn boxed(backend: impl SourceBackend + 'static) -> Vec<Box<dyn SourceBackend>> {
    vec![Box::new(backend)]
}

fn sink() -> DiagnosticSink {
    DiagnosticSink::with_config(SinkConfig::unlimited())
}

fn names(collection: &SourceCollection) -> Vec<&str> {
    collection.uris().map(FileUri::as_str).collect()
}

fn collect_with(
    backends: &[Box<dyn SourceBackend>],
    entry: &str,
    mode: LoadMode,
    diagnostics: &mut DiagnosticSink,
) -> SourceCollection {
    let vars = PreprocessorVars::new();
    collect(entry, &vars, &[], backends, mode, diagnostics)
}

#[test]
fn test_diamond_loads_shared_file_once() {
    let backends = boxed(memory(&[
        ("main.br", "using \"a\"; using \"b\";"),
        ("a.br", "using \"c\";"),
        ("b.br", "using \"c\";"),
        ("c.br", "fn c() {}"),
    ]));
    let front_end = RecordingFrontEnd::default();
    let vars = PreprocessorVars::new();
    let mut diags = sink();

    let files = SourceLoader::new(&backends, &vars)
        .with_front_end(&front_end)
        .collect("mem:main", &[], &mut diags);

    assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
    assert_eq!(
        names(&files),
        vec!["mem:main.br", "mem:a.br", "mem:b.br", "mem:c.br"]
    );
    assert_eq!(front_end.parsed.borrow().len(), 4);
    assert_eq!(files.entry.as_ref().map(FileUri::as_str), Some("mem:main.br"));
}

#[test]
fn test_directives_record_resolved_identity() {
    let backends = boxed(memory(&[
        ("main.br", "using \"a\";"),
        ("a.br", "using \"main\";"),
    ]));
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 2);
    let a = files.get(&FileUri::new("mem:a.br")).expect("a loaded");
    assert_eq!(
        a.ast.usings[0].resolved.as_ref().map(FileUri::as_str),
        Some("mem:main.br")
    );
    let directive = a.directive.as_ref().expect("a was imported");
    assert_eq!(directive.file.as_str(), "mem:main.br");
    assert_eq!(directive.path, "a");
    assert!(files.get(&FileUri::new("mem:main.br")).and_then(|f| f.directive.as_ref()).is_none());
}

#[test]
fn test_cycle_with_self_import_terminates() {
    let backends = boxed(memory(&[
        ("main.br", "using \"x\";"),
        ("x.br", "using \"y\";"),
        ("y.br", "using \"z\";"),
        ("z.br", "using \"x\"; using \"z\";"),
    ]));
    let front_end = RecordingFrontEnd::default();
    let vars = PreprocessorVars::new();
    let mut diags = sink();

    let files = SourceLoader::new(&backends, &vars)
        .with_front_end(&front_end)
        .collect("mem:main", &[], &mut diags);

    assert_eq!(files.len(), 4);
    assert_eq!(front_end.parsed.borrow().len(), 4);
    assert_eq!(diags.error_count(), 0);
}

#[test]
fn test_deferred_mode_fetches_each_file_once() {
    let (backend, fetches) = CountingBackend::new(memory(&[
        ("main.br", "using \"a\"; using \"b\"; using \"a\";"),
        ("a.br", "using \"b\";"),
        ("b.br", "using \"a\"; using \"main\";"),
    ]));
    let backends = boxed(backend);
    let mut diags = sink();

    let files = collect_with(&backends, "mem:main", LoadMode::Deferred, &mut diags);

    assert_eq!(files.len(), 3);
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[test]
fn test_blocking_mode_fetches_each_file_once() {
    let (backend, fetches) = CountingBackend::new(memory(&[
        ("main.br", "using \"a\"; using \"b\"; using \"a\";"),
        ("a.br", "using \"b\";"),
        ("b.br", "using \"a\"; using \"main\";"),
    ]));
    let backends = boxed(backend);
    let mut diags = sink();

    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 3);
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[test]
fn test_filesystem_diamond_reads_shared_file_once() {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in [
        ("main.br", "using \"b\"; using \"c\";"),
        ("b.br", "using \"d\";"),
        ("c.br", "using \"d\";"),
        ("d.br", "fn d() {}"),
    ] {
        fs::write(dir.path().join(name), text).unwrap();
    }
    let entry = dir.path().join("main.br");

    for mode in [LoadMode::Blocking, LoadMode::Deferred] {
        let (backend, fetches) = CountingBackend::new(FileSystemBackend::new(Vec::new()));
        let backends = boxed(backend);
        let mut diags = sink();

        let files = collect_with(&backends, entry.to_str().unwrap(), mode, &mut diags);

        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        assert_eq!(files.len(), 4, "{mode:?}");
        assert_eq!(fetches.load(Ordering::SeqCst), 4, "{mode:?}");
    }
}

#[test]
fn test_finished_fetches_are_parsed_before_a_slow_one() {
    let mem = memory(&[
        ("main.br", "using \"a\"; using \"b\"; using \"c\";"),
        ("a.br", ""),
        ("b.br", ""),
        ("c.br", ""),
    ]);
    let (a_parsing_tx, a_parsing_rx) = channel::bounded(1);
    let (c_fetched_tx, c_fetched_rx) = channel::bounded::<()>(1);
    let (c_parsed_tx, c_parsed_rx) = channel::bounded(1);

    // `c` is fetched while `a` is being parsed; `b` stays in flight until
    // `c` was parsed. Oldest-first alone would give main, a, b, c.
    let mut gates = FxHashMap::default();
    gates.insert(
        "mem:b.br",
        Gate {
            wait_for: Some(c_parsed_rx),
            ..Gate::default()
        },
    );
    gates.insert(
        "mem:c.br",
        Gate {
            wait_for: Some(a_parsing_rx),
            then_signal: Some(c_fetched_tx),
        },
    );
    let backends = boxed(GatedBackend { inner: mem, gates });

    let mut front_end = HookedFrontEnd::default();
    front_end.before_parse.insert(
        FileUri::new("mem:a.br"),
        Box::new(move || {
            let _ = a_parsing_tx.send(());
            let _ = c_fetched_rx.recv_timeout(GATE_TIMEOUT);
            // Let the fetch thread hand the content over.
            thread::sleep(Duration::from_millis(50));
        }),
    );
    front_end.before_parse.insert(
        FileUri::new("mem:c.br"),
        Box::new(move || {
            let _ = c_parsed_tx.send(());
        }),
    );
    let vars = PreprocessorVars::new();
    let mut diags = sink();

    let files = SourceLoader::new(&backends, &vars)
        .with_front_end(&front_end)
        .with_mode(LoadMode::Deferred)
        .collect("mem:main", &[], &mut diags);

    assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
    assert_eq!(
        names(&files),
        vec!["mem:main.br", "mem:a.br", "mem:c.br", "mem:b.br"]
    );
    assert_eq!(front_end.recorder.parsed.borrow().len(), 4);
}

#[test]
fn test_deferred_and_blocking_load_the_same_files() {
    let mem = memory(&[
        ("main.br", "using \"a\"; using \"b\";"),
        ("a.br", "using \"c\"; using \"d\";"),
        ("b.br", "using \"d\";"),
        ("c.br", ""),
        ("d.br", "using \"a\";"),
    ]);
    let backends = boxed(mem);

    let mut blocking_diags = sink();
    let blocking = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut blocking_diags);
    let mut deferred_diags = sink();
    let deferred = collect_with(&backends, "mem:main", LoadMode::Deferred, &mut deferred_diags);

    let mut a = names(&blocking);
    let mut b = names(&deferred);
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
    assert_eq!(deferred.files[0].uri.as_str(), "mem:main.br");
    assert!(deferred_diags.is_empty());
}

#[test]
fn test_missing_import_is_reported_at_directive() {
    let backends = boxed(memory(&[("main.br", "using \"nope\";\nfn f() {}")]));
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 1);
    assert!(files.files[0].ast.usings[0].resolved.is_none());

    let diag = diags.iter().next().expect("one diagnostic");
    assert_eq!(diag.code, ErrorCode::E3001);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.file.as_ref().map(FileUri::as_str), Some("mem:main.br"));
    assert_eq!(diag.primary_span(), Some(files.files[0].ast.usings[0].span));
}

#[test]
fn test_unhandled_scheme_reports_no_backend() {
    let backends = boxed(memory(&[("main.br", "using \"web:lib\";")]));
    let mut diags = sink();
    collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert!(diags.contains_code(ErrorCode::E3002));
    assert!(!diags.contains_code(ErrorCode::E3001));
}

#[test]
fn test_missing_entry_is_critical() {
    let backends = boxed(memory(&[]));
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert!(files.is_empty());
    assert!(files.entry.is_none());
    let diag = diags.iter().next().expect("one diagnostic");
    assert_eq!(diag.code, ErrorCode::E3001);
    assert_eq!(diag.severity, Severity::Critical);
    assert!(diag.file.is_none());
}

#[test]
fn test_duplicate_import_in_one_file_warns() {
    let backends = boxed(memory(&[
        ("main.br", "using \"a\";\nusing \"a.br\";"),
        ("a.br", ""),
    ]));
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 2);
    assert_eq!(diags.error_count(), 0);
    let warning = diags.iter().next().expect("warning");
    assert_eq!(warning.code, ErrorCode::W3001);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(
        warning.primary_span(),
        Some(files.files[0].ast.usings[1].span)
    );
}

#[test]
fn test_same_file_from_different_importers_does_not_warn() {
    let backends = boxed(memory(&[
        ("main.br", "using \"a\"; using \"b\";"),
        ("a.br", "using \"b\";"),
        ("b.br", ""),
    ]));
    let mut diags = sink();
    collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);
    assert!(diags.is_empty());
}

#[test]
fn test_additional_imports_resolve_relative_to_entry() {
    let backends = boxed(memory(&[("main.br", ""), ("prelude.br", "fn p() {}")]));
    let vars = PreprocessorVars::new();
    let mut diags = sink();
    let files = SourceLoader::new(&backends, &vars).collect(
        "mem:main",
        &["prelude".to_string()],
        &mut diags,
    );

    assert_eq!(names(&files), vec!["mem:main.br", "mem:prelude.br"]);
    assert!(files.files[1].directive.is_none());
}

#[test]
fn test_backend_error_stops_search() {
    let fixed = FixedBackend {
        scheme: "bad",
        answer: |uri| LoadOutcome::Error {
            uri,
            message: "permission denied".to_string(),
        },
    };
    let backends: Vec<Box<dyn SourceBackend>> = vec![
        Box::new(fixed),
        Box::new(memory(&[("main.br", "using \"bad:x\";")])),
    ];
    let mut diags = sink();
    collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    let diag = diags.iter().next().expect("diagnostic");
    assert_eq!(diag.code, ErrorCode::E3003);
    assert!(diag.notes.iter().any(|n| n.contains("permission denied")));
}

#[test]
fn test_missing_content_is_internal_error() {
    let fixed = FixedBackend {
        scheme: "void",
        answer: |uri| LoadOutcome::Success {
            uri,
            content: ContentStream::Missing,
        },
    };
    let backends: Vec<Box<dyn SourceBackend>> = vec![
        Box::new(memory(&[("main.br", "using \"void:x\";")])),
        Box::new(fixed),
    ];
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 1);
    let diag = diags.iter().next().expect("diagnostic");
    assert_eq!(diag.code, ErrorCode::E9003);
    assert_eq!(diag.severity, Severity::Internal);
}

#[test]
fn test_failed_deferred_fetch_reports_not_found() {
    let fixed = FixedBackend {
        scheme: "gone",
        answer: |uri| LoadOutcome::Success {
            uri,
            content: ContentStream::Deferred(Box::new(|| -> Result<String, FetchError> {
                Err(FetchError::Vanished("x".to_string()))
            })),
        },
    };
    let backends: Vec<Box<dyn SourceBackend>> = vec![
        Box::new(memory(&[("main.br", "using \"gone:x\";")])),
        Box::new(fixed),
    ];

    for mode in [LoadMode::Blocking, LoadMode::Deferred] {
        let mut diags = sink();
        let files = collect_with(&backends, "mem:main", mode, &mut diags);
        assert_eq!(files.len(), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.code, ErrorCode::E3001);
        assert_eq!(diag.file.as_ref().map(FileUri::as_str), Some("mem:main.br"));
    }
}

#[test]
fn test_syntax_errors_do_not_stop_the_walk() {
    let backends = boxed(memory(&[
        ("main.br", "using \"a\"; let = ;"),
        ("a.br", "fn a() {}"),
    ]));
    let mut diags = sink();
    let files = collect_with(&backends, "mem:main", LoadMode::Blocking, &mut diags);

    assert_eq!(files.len(), 2);
    assert!(diags.error_count() > 0);
}

#[test]
fn test_read_source_returns_content() {
    let backends = boxed(memory(&[("lib.br", "fn lib() {}")]));
    let (uri, text) = read_source("mem:lib", None, &backends).expect("found");
    assert_eq!(uri.as_str(), "mem:lib.br");
    assert_eq!(text, "fn lib() {}");
}

#[test]
fn test_read_source_failures() {
    let backends = boxed(memory(&[]));
    let missing = read_source("mem:lib", None, &backends).unwrap_err();
    assert_eq!(missing.code, ErrorCode::E3001);
    let unhandled = read_source("lib", None, &backends).unwrap_err();
    assert_eq!(unhandled.code, ErrorCode::E3002);
}

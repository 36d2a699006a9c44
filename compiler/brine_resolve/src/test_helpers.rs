//! Shared helpers for unit tests: load in-memory sources.

use brine_diagnostic::{DiagnosticSink, SinkConfig};
use brine_lexer::PreprocessorVars;
use brine_source::{LoadMode, MemoryBackend, SourceBackend, SourceCollection, SourceLoader};

/// Load `files` (name, text) from memory, starting at the first one.
pub(crate) fn load(files: &[(&str, &str)]) -> (SourceCollection, DiagnosticSink) {
    let mem = MemoryBackend::new();
    for (name, text) in files {
        mem.insert(*name, *text);
    }
    let backends: Vec<Box<dyn SourceBackend>> = vec![Box::new(mem)];
    let vars = PreprocessorVars::new();
    let mut diagnostics = DiagnosticSink::with_config(SinkConfig::unlimited());
    let entry = format!("mem:{}", files.first().map_or("main.br", |(name, _)| name));
    let sources = SourceLoader::new(&backends, &vars)
        .with_mode(LoadMode::Blocking)
        .collect(&entry, &[], &mut diagnostics);
    (sources, diagnostics)
}

/// Codes of every collected diagnostic, in push order.
pub(crate) fn codes(diagnostics: &DiagnosticSink) -> Vec<brine_diagnostic::ErrorCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

//! Per-compilation state.

use std::io::Write;

use brine_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use brine_diagnostic::{DiagnosticSink, ErrorGuaranteed};
use brine_ir::FileUri;
use brine_source::{
    BundleBackend, FileSystemBackend, LoadMode, MemoryBackend, ParsedFile, SourceBackend,
    SourceCollection, SourceLoader,
};
use brine_resolve::{CompiledResult, TemplateCache};

use crate::config::CompileOptions;

/// Scheme of the bundled standard sources.
pub const STD_SCHEME: &str = "std";

const STD_CORE: &str = include_str!("../std/core.br");

/// The standard bundle: `std:core`.
pub fn std_bundle() -> BundleBackend {
    BundleBackend::new(STD_SCHEME).with_file("core", STD_CORE)
}

/// Owns what one compilation accumulates: diagnostics, generic
/// instantiations and the backends files are read from.
///
/// Backends are asked in order: in-memory files (`mem:`), the standard
/// bundle (`std:`), then the file system.
pub struct CompilerContext {
    options: CompileOptions,
    pub diagnostics: DiagnosticSink,
    pub templates: TemplateCache,
    memory: MemoryBackend,
    backends: Vec<Box<dyn SourceBackend>>,
}

impl CompilerContext {
    pub fn new(options: CompileOptions) -> Self {
        let memory = MemoryBackend::new();
        let backends: Vec<Box<dyn SourceBackend>> = vec![
            Box::new(memory.clone()),
            Box::new(std_bundle()),
            Box::new(FileSystemBackend::from_env(Vec::new())),
        ];
        CompilerContext {
            diagnostics: DiagnosticSink::with_config(options.sink_config()),
            templates: TemplateCache::new(),
            options,
            memory,
            backends,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// In-memory files, shared with the loader.
    pub fn memory(&self) -> &MemoryBackend {
        &self.memory
    }

    /// Load the configured entry and everything it imports.
    pub fn load(&mut self) -> SourceCollection {
        let entry = self.options.entry.clone();
        self.load_entry(&entry)
    }

    fn load_entry(&mut self, entry: &str) -> SourceCollection {
        let vars = self.options.preprocessor_vars();
        let mode = if self.options.deferred {
            LoadMode::Deferred
        } else {
            LoadMode::Blocking
        };
        SourceLoader::new(&self.backends, &vars)
            .with_mode(mode)
            .collect(entry, &self.options.imports, &mut self.diagnostics)
    }

    /// Load and analyze the configured entry.
    pub fn compile(&mut self) -> CompiledResult {
        let entry = self.options.entry.clone();
        self.compile_entry(&entry)
    }

    /// Store `text` as the in-memory file `name` and compile it as the
    /// entry.
    pub fn compile_snippet(&mut self, name: &str, text: &str) -> CompiledResult {
        let uri: FileUri = self.memory.insert(name, text);
        self.compile_entry(uri.as_str())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn compile_entry(&mut self, entry: &str) -> CompiledResult {
        // Instantiations point at the previous compilation's declarations.
        self.templates = TemplateCache::new();
        let sources = self.load_entry(entry);
        let result = brine_resolve::analyze(
            sources,
            &mut self.templates,
            &mut self.diagnostics,
            self.options.interactive,
        );
        tracing::debug!(
            files = result.files.len(),
            errors = self.diagnostics.error_count(),
            "compilation finished"
        );
        result
    }

    /// Write every collected diagnostic to `emitter`, then a summary.
    ///
    /// The sink is drained; an error in it makes this return `Err`.
    pub fn report<W: Write>(
        &mut self,
        files: &[ParsedFile],
        emitter: &mut TerminalEmitter<W>,
    ) -> Result<(), ErrorGuaranteed> {
        for file in files {
            emitter.add_source(file.uri.clone(), file.source.to_string());
        }
        let guarantee = self.diagnostics.has_errors();
        let errors = self.diagnostics.error_count();
        let warnings = self.diagnostics.warning_count();
        for diag in self.diagnostics.flush() {
            emitter.emit(&diag);
        }
        emitter.emit_summary(errors, warnings);
        emitter.flush();
        match guarantee {
            Some(guarantee) => Err(guarantee),
            None => Ok(()),
        }
    }
}

//! The compiled program.
//!
//! [`CompiledResult`] is built once per compilation and only read
//! afterwards. Position lookups scan the declarations of one file.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use brine_ir::{FileUri, Span, Stmt};
use brine_source::{ParsedFile, SourceCollection};

use crate::checker::CheckReport;
use crate::collect::Declarations;
use crate::function::{AliasDef, Field, Function, StructDef};
use crate::template::{CompliableTemplate, TemplateCache};

/// Everything a compilation produced.
#[derive(Debug)]
pub struct CompiledResult {
    /// Parsed files in parse order.
    pub files: Vec<ParsedFile>,
    pub functions: Vec<Arc<Function>>,
    pub general_functions: Vec<Arc<Function>>,
    pub operators: Vec<Arc<Function>>,
    pub constructors: Vec<Arc<Function>>,
    pub externals: Vec<Arc<Function>>,
    pub aliases: Vec<AliasDef>,
    pub structs: Vec<Arc<StructDef>>,
    /// Top-level statements per file.
    pub statements: Vec<(FileUri, Vec<Stmt>)>,
    pub entry: Option<FileUri>,
    /// Built for an interactive session rather than a whole program.
    pub interactive: bool,
    /// Every instantiation the compilation created.
    pub templates: Vec<Arc<CompliableTemplate>>,
    /// Globals read by each function body that reads any.
    pub captures: Vec<(Arc<Function>, BTreeSet<String>)>,
}

/// A declaration found by position.
#[derive(Clone, Copy, Debug)]
pub enum Declaration<'r> {
    Function(&'r Arc<Function>),
    Struct(&'r Arc<StructDef>),
    Alias(&'r AliasDef),
}

impl Declaration<'_> {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Struct(s) => &s.name,
            Declaration::Alias(a) => &a.name,
        }
    }

    pub fn name_span(&self) -> Span {
        match self {
            Declaration::Function(f) => f.name_span,
            Declaration::Struct(s) => s.name_span,
            Declaration::Alias(a) => a.name_span,
        }
    }
}

impl fmt::Display for Declaration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Function(function) => {
                write!(f, "{} {}", function.kind.label(), function.signature())
            }
            Declaration::Struct(def) => write!(f, "struct {}", def.self_type()),
            Declaration::Alias(alias) => {
                write!(f, "alias {} = {}", alias.name, alias.ty.resolve_aliases())
            }
        }
    }
}

impl CompiledResult {
    pub fn new(
        sources: SourceCollection,
        decls: Declarations,
        report: CheckReport,
        templates: &TemplateCache,
        interactive: bool,
    ) -> Self {
        CompiledResult {
            files: sources.files,
            functions: decls.functions,
            general_functions: decls.general_functions,
            operators: decls.operators,
            constructors: decls.constructors,
            externals: decls.externals,
            aliases: decls.aliases,
            structs: decls.structs,
            statements: decls.statements,
            entry: sources.entry,
            interactive,
            templates: templates.iter().cloned().collect(),
            captures: report.captures,
        }
    }

    pub fn file(&self, uri: &FileUri) -> Option<&ParsedFile> {
        self.files.iter().find(|f| &f.uri == uri)
    }

    /// Files declaring something, each once, in first-seen order over
    /// functions, general functions, operators and then structs.
    pub fn files_of(&self) -> Vec<&FileUri> {
        let mut seen = FxHashSet::default();
        self.callables()
            .filter_map(|f| f.file.as_ref())
            .chain(self.structs.iter().map(|s| &s.file))
            .filter(|file| seen.insert(*file))
            .collect()
    }

    /// Top-level statements of `file`, then the body of every function,
    /// general function and operator declared there.
    pub fn statements_of<'r>(&'r self, file: &'r FileUri) -> impl Iterator<Item = &'r Stmt> {
        let top_level = self
            .statements
            .iter()
            .filter(move |(f, _)| f == file)
            .flat_map(|(_, stmts)| stmts);
        let bodies = self
            .callables()
            .filter(move |f| f.file.as_ref() == Some(file))
            .filter_map(|f| f.body.as_ref())
            .flat_map(|body| &body.stmts);
        top_level.chain(bodies)
    }

    /// The declaration whose name covers `offset` in `file`.
    pub fn declaration_at(&self, file: &FileUri, offset: u32) -> Option<Declaration<'_>> {
        let in_file = |f: &&Arc<Function>| f.file.as_ref() == Some(file);
        self.callables()
            .filter(in_file)
            .find(|f| f.name_span.touches(offset))
            .map(Declaration::Function)
            .or_else(|| {
                self.structs
                    .iter()
                    .filter(|s| &s.file == file)
                    .find(|s| s.name_span.touches(offset))
                    .map(Declaration::Struct)
            })
            .or_else(|| {
                self.aliases
                    .iter()
                    .filter(|a| &a.file == file)
                    .find(|a| a.name_span.touches(offset))
                    .map(Declaration::Alias)
            })
    }

    /// The struct field whose name covers `offset` in `file`.
    pub fn field_at(&self, file: &FileUri, offset: u32) -> Option<(&StructDef, &Field)> {
        self.structs
            .iter()
            .filter(|s| &s.file == file)
            .find_map(|s| {
                s.fields
                    .iter()
                    .find(|field| field.span.touches(offset))
                    .map(|field| (&**s, field))
            })
    }

    /// Globals `function`'s body reads.
    pub fn captures_of(&self, function: &Arc<Function>) -> Option<&BTreeSet<String>> {
        self.captures
            .iter()
            .find(|(f, _)| Arc::ptr_eq(f, function))
            .map(|(_, names)| names)
    }

    /// Instantiations created from `template`.
    pub fn instantiations_of<'r>(
        &'r self,
        template: &'r Arc<Function>,
    ) -> impl Iterator<Item = &'r Arc<CompliableTemplate>> {
        self.templates
            .iter()
            .filter(move |t| Arc::ptr_eq(&t.original, template))
    }

    fn callables(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions
            .iter()
            .chain(&self.general_functions)
            .chain(&self.operators)
    }
}

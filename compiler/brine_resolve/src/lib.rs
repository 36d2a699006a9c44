//! Brine Resolve - declarations, overload resolution and the compiled program.
//!
//! # Main Entry Points
//!
//! - [`analyze`]: collect declarations, check every body and build the
//!   [`CompiledResult`]
//! - [`resolve`]: pick the best candidate of a pool for a [`FunctionQuery`]
//! - [`TemplateCache`]: per-compilation memo of generic instantiations
//!
//! # Module Organization
//!
//! - `function`: resolved functions, parameters, structs and aliases
//! - `query`: resolution requests
//! - `engine`: candidate scoring, ranking and instantiation
//! - `template`: the instantiation cache
//! - `builtins`: builtin functions and operators
//! - `collect`: symbol tables from parsed files
//! - `frame`: per-body checking state
//! - `checker`: statement and expression checking
//! - `aggregate`: the compiled program and its lookups

pub mod aggregate;
pub mod builtins;
pub mod checker;
pub mod collect;
pub mod engine;
pub mod frame;
pub mod function;
pub mod query;
pub mod template;

#[cfg(test)]
mod test_helpers;

pub use aggregate::{CompiledResult, Declaration};
pub use builtins::Builtins;
pub use checker::{check_program, CheckReport};
pub use collect::{collect_declarations, Declarations};
pub use engine::{resolve, FunctionMatch, Resolved};
pub use frame::{CompiledFrame, FrameFlags};
pub use function::{
    Acceptor, AliasDef, Field, Function, FunctionKind, ParamType, Parameter, StructDef,
};
pub use query::{Converter, FunctionQuery, Identifier};
pub use template::{CompliableTemplate, TemplateCache};

use brine_diagnostic::DiagnosticSink;
use brine_source::SourceCollection;

/// Run the semantic passes over loaded sources.
///
/// `templates` belongs to the caller's compilation; instantiations created
/// here stay cached in it.
#[tracing::instrument(level = "debug", skip_all, fields(files = sources.len(), interactive))]
pub fn analyze(
    sources: SourceCollection,
    templates: &mut TemplateCache,
    diagnostics: &mut DiagnosticSink,
    interactive: bool,
) -> CompiledResult {
    let decls = collect_declarations(&sources, diagnostics);
    let builtins = Builtins::new();
    let report = check_program(&decls, &builtins, templates, diagnostics);
    CompiledResult::new(sources, decls, report, templates, interactive)
}

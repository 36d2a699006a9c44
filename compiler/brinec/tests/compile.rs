//! End-to-end compilation through the driver library.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use brine_diagnostic::emitter::{ColorMode, TerminalEmitter};
use brine_diagnostic::{Diagnostic, ErrorCode};
use brinec::{describe_position, file_listing, CompileOptions, CompilerContext};

const MAIN: &str = "using \"util\";\n\
                    using \"std:core\";\n\
                    let r = Range(1, 4);\n\
                    print(r.length());\n\
                    print(square(2.5));\n\
                    let n = double(3);\n";

const UTIL: &str = "fn double(x: int) -> int { return x * 2; }\n";

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        fs::write(dir.path().join(name), text).unwrap();
    }
    dir
}

fn options_for(dir: &Path, entry: &str) -> CompileOptions {
    let mut options = CompileOptions::new(dir.join(entry).to_string_lossy().into_owned());
    options.error_limit = 0;
    options
}

fn diagnostics(ctx: &CompilerContext) -> Vec<&Diagnostic> {
    ctx.diagnostics.iter().collect()
}

#[test]
fn test_filesystem_project_with_std_bundle() {
    let dir = project(&[("main.br", MAIN), ("util.br", UTIL)]);
    let mut ctx = CompilerContext::new(options_for(dir.path(), "main.br"));
    let result = ctx.compile();
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));

    let listing = file_listing(&result);
    assert_eq!(listing.len(), 3);
    assert!(listing[0].ends_with("main.br (entry)"), "{listing:?}");
    assert!(listing[1].contains("util.br (imported by "), "{listing:?}");
    assert!(listing[2].starts_with("std:core (imported by "), "{listing:?}");
}

#[test]
fn test_deferred_loading_matches_blocking() {
    let dir = project(&[("main.br", MAIN), ("util.br", UTIL)]);
    let blocking = CompilerContext::new(options_for(dir.path(), "main.br")).compile();

    let mut options = options_for(dir.path(), "main.br");
    options.deferred = true;
    let mut ctx = CompilerContext::new(options);
    let deferred = ctx.compile();
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));

    let uris = |result: &brine_resolve::CompiledResult| {
        let mut uris: Vec<String> = result.files.iter().map(|f| f.uri.to_string()).collect();
        uris.sort();
        uris
    };
    assert_eq!(uris(&blocking), uris(&deferred));
}

#[test]
fn test_preprocessor_defines_select_declarations() {
    let source = "#if FAST\n\
                  fn speed() -> int { return 2; }\n\
                  #else\n\
                  fn speed() -> string { return \"slow\"; }\n\
                  #endif\n\
                  let s: int = speed();\n";
    let dir = project(&[("main.br", source)]);

    let mut ctx = CompilerContext::new(options_for(dir.path(), "main.br"));
    ctx.compile();
    assert!(ctx.diagnostics.has_errors().is_some());

    let mut options = options_for(dir.path(), "main.br");
    options.defines.push("FAST".to_string());
    let mut ctx = CompilerContext::new(options);
    ctx.compile();
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));
}

#[test]
fn test_additional_imports_are_loaded() {
    let dir = project(&[("main.br", "print(square(3));\n")]);

    let mut ctx = CompilerContext::new(options_for(dir.path(), "main.br"));
    ctx.compile();
    assert!(ctx.diagnostics.contains_code(ErrorCode::E2011));

    let mut options = options_for(dir.path(), "main.br");
    options.imports.push("std:core".to_string());
    let mut ctx = CompilerContext::new(options);
    let result = ctx.compile();
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));
    assert_eq!(result.files.len(), 2);
}

#[test]
fn test_missing_import_is_reported_and_rendered() {
    let dir = project(&[("main.br", "using \"nowhere\";\nprint(1);\n")]);
    let mut ctx = CompilerContext::new(options_for(dir.path(), "main.br"));
    let result = ctx.compile();
    assert!(ctx.diagnostics.contains_code(ErrorCode::E3001));
    assert_eq!(result.files.len(), 1);

    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    assert!(ctx.report(&result.files, &mut emitter).is_err());
    assert!(ctx.diagnostics.is_empty());

    let output = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(output.contains("[E3001]"), "{output}");
    assert!(output.contains("nowhere"), "{output}");
    assert!(output.contains("aborting due to previous error"), "{output}");
}

#[test]
fn test_duplicate_import_is_only_a_warning() {
    let dir = project(&[(
        "main.br",
        "using \"std:core\";\nusing \"std:core\";\nprint(square(2));\n",
    )]);
    let mut ctx = CompilerContext::new(options_for(dir.path(), "main.br"));
    let result = ctx.compile();
    assert!(ctx.diagnostics.contains_code(ErrorCode::W3001));

    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    assert!(ctx.report(&result.files, &mut emitter).is_ok());
    let output = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(output.contains("1 warning emitted"), "{output}");
}

#[test]
fn test_snippets_compile_from_memory() {
    let source = "struct Square { side: float, }\n\
                  fn twice(x: int) -> int { return x + x; }\n\
                  let y = twice(2);\n";
    let mut options = CompileOptions::new("unused");
    options.interactive = true;
    let mut ctx = CompilerContext::new(options);
    let result = ctx.compile_snippet("repl.br", source);
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));
    assert!(result.interactive);
    assert!(ctx.memory().contains("repl.br"));

    let offset = |needle: &str| u32::try_from(source.find(needle).unwrap()).unwrap();
    assert_eq!(
        describe_position(&result, offset("twice(x")),
        Some("function twice(int) -> int".to_string())
    );
    assert_eq!(
        describe_position(&result, offset("side")),
        Some("field Square.side: float".to_string())
    );
    assert_eq!(
        describe_position(&result, offset("Square {")),
        Some("struct Square".to_string())
    );
    assert_eq!(describe_position(&result, offset("let")), None);
}

#[test]
fn test_generic_instantiations_are_kept_per_compilation() {
    let mut ctx = CompilerContext::new(CompileOptions::new("unused"));
    let result = ctx.compile_snippet(
        "generic.br",
        "using \"std:core\";\nlet a = identity(1);\nlet b = identity(\"s\");\n",
    );
    assert!(ctx.diagnostics.is_empty(), "{:?}", diagnostics(&ctx));
    assert_eq!(result.templates.len(), 2);
    assert_eq!(ctx.templates.len(), 2);

    let again = ctx.compile_snippet("generic.br", "let c = 1;\n");
    assert!(again.templates.is_empty());
}

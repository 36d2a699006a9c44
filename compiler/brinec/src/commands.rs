//! Command handlers for the brine CLI.
//!
//! Each handler runs one compilation, prints to stdout, reports diagnostics
//! to stderr and returns the process exit code.

use std::io::IsTerminal;
use std::process::ExitCode;

use brine_diagnostic::emitter::TerminalEmitter;

use crate::config::CompileOptions;
use crate::context::CompilerContext;
use crate::describe::{describe_position, file_listing};

fn stderr_emitter(options: &CompileOptions) -> TerminalEmitter<std::io::Stderr> {
    let is_tty = std::io::stderr().is_terminal();
    TerminalEmitter::<std::io::Stderr>::stderr(options.color, is_tty)
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Load, resolve and check a program.
pub fn check_file(options: CompileOptions) -> ExitCode {
    let mut emitter = stderr_emitter(&options);
    let mut ctx = CompilerContext::new(options);
    let result = ctx.compile();
    let failed = ctx.report(&result.files, &mut emitter).is_err();
    if !failed {
        println!(
            "checked {} file{}: {} functions, {} structs, {} instantiations",
            result.files.len(),
            if result.files.len() == 1 { "" } else { "s" },
            result.functions.len() + result.general_functions.len() + result.operators.len(),
            result.structs.len(),
            result.templates.len(),
        );
    }
    exit_code(failed)
}

/// Print every file the program loads.
pub fn list_files(options: CompileOptions) -> ExitCode {
    let mut emitter = stderr_emitter(&options);
    let mut ctx = CompilerContext::new(options);
    let result = ctx.compile();
    for line in file_listing(&result) {
        println!("{line}");
    }
    exit_code(ctx.report(&result.files, &mut emitter).is_err())
}

/// Print what the entry file declares at `offset`.
pub fn describe_at(options: CompileOptions, offset: u32) -> ExitCode {
    let mut emitter = stderr_emitter(&options);
    let mut ctx = CompilerContext::new(options);
    let result = ctx.compile();
    // Positions stay meaningful even when the program has errors.
    let _ = ctx.report(&result.files, &mut emitter);
    match describe_position(&result, offset) {
        Some(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        None => {
            println!("no declaration at offset {offset}");
            ExitCode::FAILURE
        }
    }
}

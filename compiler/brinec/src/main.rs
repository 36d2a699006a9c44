//! Brine Compiler CLI

use std::process::ExitCode;

use brinec::commands::{check_file, describe_at, list_files};
use brinec::{init_tracing, Command};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };

    init_tracing(command.options().tree);

    match command {
        Command::Check(options) => check_file(options),
        Command::Files(options) => list_files(options),
        Command::At { options, offset } => describe_at(options, offset),
    }
}

fn print_usage() {
    eprintln!("Brine Compiler");
    eprintln!();
    eprintln!("Usage: brinec <command> <file.br> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check <file>           Load, resolve and check a program");
    eprintln!("  files <file>           List every file the program loads");
    eprintln!("  at <file> <offset>     Describe the declaration at a byte offset");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -D <name>              Define a preprocessor variable");
    eprintln!("  --import <path>        Load a file as if the entry imported it");
    eprintln!("  --async                Fetch files on worker threads");
    eprintln!("  --interactive          Build the result for an interactive session");
    eprintln!("  --error-limit <n>      Stop collecting errors after n (0 = no limit)");
    eprintln!("  --color=<mode>         auto, always or never");
    eprintln!("  --tree                 Nest log output by span");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BRINE_PATH             Extra directories searched for imports");
    eprintln!("  BRINE_LOG              Log filter, e.g. brine_resolve=debug");
}

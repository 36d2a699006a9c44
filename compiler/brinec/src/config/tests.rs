use pretty_assertions::assert_eq;

use brine_diagnostic::emitter::ColorMode;

use super::*;

fn args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[test]
fn test_parse_check_options() {
    let command = Command::parse(&args(
        "check main.br -D DEBUG -DTRACE --import std:core --async --interactive \
         --error-limit 5 --color=never --tree",
    ));
    let expected = CompileOptions {
        entry: "main.br".to_string(),
        defines: vec!["DEBUG".to_string(), "TRACE".to_string()],
        imports: vec!["std:core".to_string()],
        deferred: true,
        interactive: true,
        error_limit: 5,
        color: ColorMode::Never,
        tree: true,
    };
    assert_eq!(command, Ok(Command::Check(expected)));
}

#[test]
fn test_defaults() {
    let Ok(Command::Files(options)) = Command::parse(&args("files main.br")) else {
        panic!("expected the files command");
    };
    assert_eq!(options, CompileOptions::new("main.br"));
    assert_eq!(options.sink_config().error_limit, 50);
    assert!(options.preprocessor_vars().is_empty());
}

#[test]
fn test_at_takes_the_offset_after_the_path() {
    let command = Command::parse(&args("at main.br 42 -D X"));
    let Ok(Command::At { options, offset }) = command else {
        panic!("expected the at command, got {command:?}");
    };
    assert_eq!(offset, 42);
    assert_eq!(options.entry, "main.br");
    assert!(options.preprocessor_vars().is_defined("X"));
}

#[test]
fn test_errors() {
    assert_eq!(Command::parse(&[]), Err(ConfigError::MissingCommand));
    assert_eq!(
        Command::parse(&args("build main.br")),
        Err(ConfigError::UnknownCommand("build".to_string()))
    );
    assert_eq!(
        Command::parse(&args("check")),
        Err(ConfigError::MissingPath)
    );
    assert_eq!(
        Command::parse(&args("check main.br -D")),
        Err(ConfigError::MissingValue("-D".to_string()))
    );
    assert_eq!(
        Command::parse(&args("check main.br --color=sometimes")),
        Err(ConfigError::InvalidValue {
            flag: "--color".to_string(),
            value: "sometimes".to_string(),
        })
    );
    assert_eq!(
        Command::parse(&args("check main.br --error-limit many")),
        Err(ConfigError::InvalidValue {
            flag: "--error-limit".to_string(),
            value: "many".to_string(),
        })
    );
    assert_eq!(
        Command::parse(&args("check main.br --fast")),
        Err(ConfigError::UnknownOption("--fast".to_string()))
    );
    assert_eq!(
        Command::parse(&args("check main.br other.br")),
        Err(ConfigError::UnexpectedArgument("other.br".to_string()))
    );
    assert_eq!(
        Command::parse(&args("at main.br here")),
        Err(ConfigError::InvalidValue {
            flag: "offset".to_string(),
            value: "here".to_string(),
        })
    );
}

//! Command-line configuration.
//!
//! Arguments are parsed by hand: every command takes a source path first,
//! then flags in any order.

use brine_diagnostic::emitter::ColorMode;
use brine_diagnostic::SinkConfig;
use brine_lexer::PreprocessorVars;

/// Everything that shapes one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Entry path as given on the command line.
    pub entry: String,
    /// Preprocessor variables (`-D NAME`).
    pub defines: Vec<String>,
    /// Files loaded as if the entry imported them (`--import PATH`).
    pub imports: Vec<String>,
    /// Fetch file content on worker threads (`--async`).
    pub deferred: bool,
    /// Build the result for an interactive session (`--interactive`).
    pub interactive: bool,
    /// Errors kept before the rest are dropped; `0` keeps all.
    pub error_limit: usize,
    pub color: ColorMode,
    /// Hierarchical span output for logging (`--tree`).
    pub tree: bool,
}

impl CompileOptions {
    pub fn new(entry: impl Into<String>) -> Self {
        CompileOptions {
            entry: entry.into(),
            defines: Vec::new(),
            imports: Vec::new(),
            deferred: false,
            interactive: false,
            error_limit: SinkConfig::default().error_limit,
            color: ColorMode::Auto,
            tree: false,
        }
    }

    /// Parse `<file> [flags]...`.
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let mut entry = None;
        let mut options = CompileOptions::new(String::new());
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-D" => options.defines.push(value_of(arg, iter.next())?),
                "--import" => options.imports.push(value_of(arg, iter.next())?),
                "--async" => options.deferred = true,
                "--interactive" => options.interactive = true,
                "--tree" => options.tree = true,
                "--error-limit" => {
                    let value = value_of(arg, iter.next())?;
                    options.error_limit = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: arg.clone(),
                        value,
                    })?;
                }
                other => {
                    if let Some(name) = other.strip_prefix("-D").filter(|n| !n.is_empty()) {
                        options.defines.push(name.to_string());
                    } else if let Some(mode) = other.strip_prefix("--color=") {
                        options.color =
                            ColorMode::parse(mode).ok_or_else(|| ConfigError::InvalidValue {
                                flag: "--color".to_string(),
                                value: mode.to_string(),
                            })?;
                    } else if other.starts_with('-') {
                        return Err(ConfigError::UnknownOption(other.to_string()));
                    } else if entry.is_none() {
                        entry = Some(other.to_string());
                    } else {
                        return Err(ConfigError::UnexpectedArgument(other.to_string()));
                    }
                }
            }
        }
        options.entry = entry.ok_or(ConfigError::MissingPath)?;
        Ok(options)
    }

    pub fn preprocessor_vars(&self) -> PreprocessorVars {
        let mut vars = PreprocessorVars::new();
        for name in &self.defines {
            vars.define(name.as_str());
        }
        vars
    }

    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            error_limit: self.error_limit,
            ..SinkConfig::default()
        }
    }
}

fn value_of(flag: &str, value: Option<&String>) -> Result<String, ConfigError> {
    value
        .cloned()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

/// A driver command with its options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Load and check a program, reporting diagnostics.
    Check(CompileOptions),
    /// List every loaded file.
    Files(CompileOptions),
    /// Describe the declaration or field at a byte offset of the entry file.
    At { options: CompileOptions, offset: u32 },
}

impl Command {
    /// Parse the arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let Some((name, rest)) = args.split_first() else {
            return Err(ConfigError::MissingCommand);
        };
        match name.as_str() {
            "check" => Ok(Command::Check(CompileOptions::parse(rest)?)),
            "files" => Ok(Command::Files(CompileOptions::parse(rest)?)),
            // at <file> <offset> [flags]...
            "at" => {
                let Some(text) = rest.get(1) else {
                    return Err(ConfigError::MissingValue("at".to_string()));
                };
                let offset = text.parse().map_err(|_| ConfigError::InvalidValue {
                    flag: "offset".to_string(),
                    value: text.clone(),
                })?;
                let mut remaining = rest.to_vec();
                remaining.remove(1);
                Ok(Command::At {
                    options: CompileOptions::parse(&remaining)?,
                    offset,
                })
            }
            other => Err(ConfigError::UnknownCommand(other.to_string())),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        match self {
            Command::Check(options) | Command::Files(options) | Command::At { options, .. } => {
                options
            }
        }
    }
}

/// Invalid command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("missing file path")]
    MissingPath,
    #[error("`{0}` expects a value")]
    MissingValue(String),
    #[error("invalid value `{value}` for `{flag}`")]
    InvalidValue { flag: String, value: String },
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

#[cfg(test)]
mod tests;

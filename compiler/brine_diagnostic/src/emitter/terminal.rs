//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support. When
//! the source text of a file is registered, labels are rendered as
//! `file:line:col` with the offending line and a caret underline.

use std::io::{self, Write};

use brine_ir::{FileUri, Span};
use rustc_hash::FxHashMap;

use crate::span_utils::{line_text, LineOffsetTable};
use crate::{Diagnostic, Label, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    /// Parse `auto`, `always` or `never`.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

struct RegisteredSource {
    text: String,
    lines: LineOffsetTable,
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    sources: FxHashMap<FileUri, RegisteredSource>,
}

impl<W: Write> TerminalEmitter<W> {
    /// Create a new terminal emitter with explicit color mode.
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            sources: FxHashMap::default(),
        }
    }

    /// Create a terminal emitter for stderr with explicit color mode.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    /// Register the text of a file so its labels render with line context.
    pub fn add_source(&mut self, file: FileUri, text: impl Into<String>) {
        let text = text.into();
        let lines = LineOffsetTable::build(&text);
        self.sources.insert(file, RegisteredSource { text, lines });
    }

    /// Consume the emitter, returning its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical | Severity::Error | Severity::Internal => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }

    fn write_location(&mut self, file: Option<&FileUri>, span: Span) {
        let Some(file) = file else {
            let _ = write!(self.writer, "{span:?}");
            return;
        };
        match self.sources.get(file) {
            Some(source) => {
                let (line, col) = source.lines.offset_to_line_col(&source.text, span.start);
                let _ = write!(self.writer, "{file}:{line}:{col}");
            }
            None => {
                let _ = write!(self.writer, "{file} {span:?}");
            }
        }
    }

    fn write_snippet(&mut self, file: Option<&FileUri>, label: &Label, indent: &str) {
        let Some(source) = file.and_then(|f| self.sources.get(f)) else {
            return;
        };
        let text = line_text(&source.text, label.span).to_string();
        let (line, col) = source
            .lines
            .offset_to_line_col(&source.text, label.span.start);
        let width = line.to_string().len();
        let underline_len = text
            .chars()
            .skip(col as usize - 1)
            .take(label.span.len().max(1) as usize)
            .count()
            .max(1);
        let marker = if label.is_primary { "^" } else { "-" };
        let underline = marker.repeat(underline_len);
        let pad = " ".repeat(col as usize - 1);

        let _ = writeln!(self.writer, "{indent}{:width$} |", "");
        let _ = writeln!(self.writer, "{indent}{line} | {text}");
        let _ = write!(self.writer, "{indent}{:width$} | {pad}", "");
        let color = if label.is_primary {
            colors::ERROR
        } else {
            colors::SECONDARY
        };
        self.write_colored(&format!("{underline} {}", label.message), color);
        let _ = writeln!(self.writer);
    }

    fn emit_nested(&mut self, diagnostic: &Diagnostic, depth: usize) {
        let indent = "  ".repeat(depth);

        // Header: severity[CODE]: message
        let _ = write!(self.writer, "{indent}");
        let color = Self::severity_color(diagnostic.severity);
        self.write_colored(&diagnostic.severity.to_string(), color);
        if self.colors {
            let _ = write!(
                self.writer,
                "{}[{}]{}",
                colors::BOLD,
                diagnostic.code,
                colors::RESET
            );
        } else {
            let _ = write!(self.writer, "[{}]", diagnostic.code);
        }
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        if diagnostic.labels.is_empty() {
            if let Some(file) = &diagnostic.file {
                let _ = writeln!(self.writer, "{indent}  --> {file}");
            }
        }

        for label in &diagnostic.labels {
            let file = label.file.as_ref().or(diagnostic.file.as_ref());
            let marker = if label.is_cross_file() {
                ":::"
            } else if label.is_primary {
                "-->"
            } else {
                "   "
            };
            let _ = write!(self.writer, "{indent}  {marker} ");
            self.write_location(file, label.span);
            if file.is_some_and(|f| self.sources.contains_key(f)) {
                let _ = writeln!(self.writer);
                self.write_snippet(file, label, &format!("{indent}  "));
            } else {
                let _ = write!(self.writer, ": ");
                let color = if label.is_primary {
                    colors::ERROR
                } else {
                    colors::SECONDARY
                };
                self.write_colored(&label.message, color);
                let _ = writeln!(self.writer);
            }
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "{indent}  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "{indent}  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        for cause in &diagnostic.causes {
            self.emit_nested(cause, depth + 1);
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.emit_nested(diagnostic, 0);
        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests;

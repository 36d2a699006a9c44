//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`] and [`Severity`], the building blocks
//! that the lexer, parser, source loader and resolver use to report problems.

use std::fmt;

use brine_ir::{FileUri, Span};

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// `Critical` marks failures that leave nothing to compile (the entry file
/// could not be loaded). `Internal` marks compiler invariant violations that
/// are still reported as diagnostics instead of panicking.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Note,
    Internal,
}

impl Severity {
    /// Whether this severity fails the compilation.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Severity::Critical | Severity::Error | Severity::Internal
        )
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Internal => write!(f, "internal error"),
        }
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    /// The source location to highlight.
    pub span: Span,
    /// The label text explaining this location.
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
    /// File the span belongs to, when it differs from the diagnostic's file.
    pub file: Option<FileUri>,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
            file: None,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
            file: None,
        }
    }

    /// Create a secondary label pointing into another file.
    pub fn cross_file(file: FileUri, span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
            file: Some(file),
        }
    }

    /// Check if this label references a different file.
    pub fn is_cross_file(&self) -> bool {
        self.file.is_some()
    }
}

/// A rich diagnostic with all context needed to render it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// File the primary span refers to.
    pub file: Option<FileUri>,
    /// Labeled spans showing where the error occurred.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Text suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Nested reasons, outermost first.
    pub causes: Vec<Diagnostic>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            file: None,
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
            causes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Create a critical diagnostic.
    #[cold]
    pub fn critical(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Critical)
    }

    /// Create an internal-error diagnostic.
    #[cold]
    pub fn internal(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Internal)
    }

    /// Create a note, usually attached as a cause.
    #[cold]
    pub fn note(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Note)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the file the primary span refers to.
    pub fn with_file(mut self, file: FileUri) -> Self {
        self.file = Some(file);
        self
    }

    /// Set the file only if none has been recorded yet.
    pub fn or_file(mut self, file: Option<&FileUri>) -> Self {
        if self.file.is_none() {
            self.file = file.cloned();
        }
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Add a secondary label that points into another file.
    pub fn with_cross_file_label(
        mut self,
        file: FileUri,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::cross_file(file, span, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Attach a nested reason.
    pub fn with_cause(mut self, cause: Diagnostic) -> Self {
        self.causes.push(cause);
        self
    }

    /// Attach several nested reasons.
    pub fn with_causes(mut self, causes: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.causes.extend(causes);
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Check if this diagnostic fails the compilation.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(
            f,
            "{indent}{} [{}]: {}",
            self.severity, self.code, self.message
        )?;
        if let Some(file) = &self.file {
            write!(f, "\n{indent}  --> {file}")?;
        }

        for label in &self.labels {
            let marker = if label.is_cross_file() {
                ":::"
            } else if label.is_primary {
                "-->"
            } else {
                "   "
            };
            match &label.file {
                Some(file) => write!(
                    f,
                    "\n{indent}  {marker} {file} {:?}: {}",
                    label.span, label.message
                )?,
                None => write!(f, "\n{indent}  {marker} {:?}: {}", label.span, label.message)?,
            }
        }

        for note in &self.notes {
            write!(f, "\n{indent}  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n{indent}  = help: {suggestion}")?;
        }

        for cause in &self.causes {
            writeln!(f)?;
            cause.fmt_indented(f, depth + 1)?;
        }

        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Create a "type mismatch" diagnostic.
pub fn type_mismatch(span: Span, expected: &str, found: &str, context: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message(format!(
            "type mismatch: expected `{expected}`, found `{found}`"
        ))
        .with_label(span, context)
}

/// Create an "unexpected token" diagnostic.
pub fn unexpected_token(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1001)
        .with_message(format!("unexpected token: expected {expected}, found {found}"))
        .with_label(span, format!("expected {expected}"))
}

/// Create an "expected expression" diagnostic.
pub fn expected_expression(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1002)
        .with_message(format!("expected expression, found {found}"))
        .with_label(span, "expected expression here")
}

/// Create an "unknown identifier" diagnostic.
pub fn unknown_identifier(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("unknown identifier `{name}`"))
        .with_label(span, "not found in this scope")
}

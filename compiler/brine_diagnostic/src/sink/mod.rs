//! Diagnostic sink for collecting, deduplicating and ordering diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics (same code, file, span, message)
//! - `ErrorGuaranteed` proof that errors were emitted
//! - Stable output order: by file, then by primary span

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashSet, FxHasher};

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SinkConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already collected.
    pub deduplicate: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            error_limit: 50,
            deduplicate: true,
        }
    }
}

impl SinkConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        SinkConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Collects diagnostics from every compiler phase.
///
/// ```text
/// let mut sink = DiagnosticSink::new();
/// sink.push(diagnostic);
/// let guarantee = sink.emit_error(other);
/// let ordered = sink.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    limit_reported: bool,
    seen: FxHashSet<u64>,
    config: SinkConfig,
}

fn fingerprint(diag: &Diagnostic) -> u64 {
    let mut hasher = FxHasher::default();
    diag.code.hash(&mut hasher);
    diag.file.hash(&mut hasher);
    diag.primary_span().hash(&mut hasher);
    diag.message.hash(&mut hasher);
    hasher.finish()
}

impl DiagnosticSink {
    /// Create a sink with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SinkConfig::default())
    }

    /// Create a sink with a custom configuration.
    pub fn with_config(config: SinkConfig) -> Self {
        DiagnosticSink {
            config,
            ..Default::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was kept, `false` if it was filtered
    /// (duplicate, or the error limit was already reached).
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            if !self.limit_reported {
                self.limit_reported = true;
                self.diagnostics.push(too_many_errors(self.config.error_limit));
            }
            return false;
        }

        if self.config.deduplicate && !self.seen.insert(fingerprint(&diag)) {
            return false;
        }

        if is_error {
            self.error_count += 1;
        } else if diag.severity == Severity::Warning {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Add every diagnostic from an iterator.
    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.push(diag);
        }
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The proof is returned even when the diagnostic itself was filtered:
    /// a filtered error means an equal or earlier error is already recorded.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        self.push(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Number of errors collected (critical and internal errors included).
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Proof that errors were emitted, if any were.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Diagnostics in insertion order, without clearing the sink.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether any collected diagnostic carries `code`.
    pub fn contains_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Take all diagnostics, ordered by file then primary span.
    ///
    /// Diagnostics without a file sort first; the sort is stable so equal
    /// positions keep insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.primary_span().cmp(&b.primary_span()))
        });
        self.error_count = 0;
        self.warning_count = 0;
        self.limit_reported = false;
        self.seen.clear();
        result
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_note("use --error-limit to increase the limit")
}

#[cfg(test)]
mod tests;

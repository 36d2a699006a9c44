use brine_ir::{FileUri, Span};
use pretty_assertions::assert_eq;

use super::*;

fn error_at(start: u32, message: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(message)
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn test_counts_errors_and_warnings() {
    let mut sink = DiagnosticSink::with_config(SinkConfig::unlimited());
    sink.push(error_at(0, "a"));
    sink.push(Diagnostic::warning(ErrorCode::W3001).with_message("twice"));
    sink.push(Diagnostic::internal(ErrorCode::E9003).with_message("no content"));

    assert_eq!(sink.error_count(), 2);
    assert_eq!(sink.warning_count(), 1);
    assert!(sink.has_errors().is_some());
    assert!(sink.contains_code(ErrorCode::E9003));
}

#[test]
fn test_deduplicates_identical_diagnostics() {
    let mut sink = DiagnosticSink::new();
    assert!(sink.push(error_at(4, "same")));
    assert!(!sink.push(error_at(4, "same")));
    assert!(sink.push(error_at(5, "same")));
    assert_eq!(sink.len(), 2);
}

#[test]
fn test_error_limit_reports_once() {
    let mut sink = DiagnosticSink::with_config(SinkConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for i in 0..5 {
        sink.push(error_at(i, "boom"));
    }
    assert!(sink.limit_reached());
    let codes: Vec<_> = sink.iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::E2003, ErrorCode::E2003, ErrorCode::E9002]
    );
}

#[test]
fn test_flush_orders_by_file_then_span() {
    let mut sink = DiagnosticSink::new();
    sink.push(error_at(9, "late").with_file(FileUri::new("mem:b.br")));
    sink.push(error_at(1, "early").with_file(FileUri::new("mem:b.br")));
    sink.push(error_at(5, "other").with_file(FileUri::new("mem:a.br")));

    let messages: Vec<_> = sink.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["other", "early", "late"]);
    assert!(sink.is_empty());
    assert_eq!(sink.error_count(), 0);
}

#[test]
fn test_no_errors_means_no_guarantee() {
    let mut sink = DiagnosticSink::new();
    sink.push(Diagnostic::warning(ErrorCode::W3001).with_message("dup"));
    assert!(sink.has_errors().is_none());
}

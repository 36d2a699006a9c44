#![allow(clippy::unwrap_used)]

use super::*;
use crate::ErrorCode;

fn sample_diagnostic() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2001)
        .with_message("type mismatch: expected `int`, found `string`")
        .with_label(Span::new(10, 15), "expected `int`")
        .with_note("int and string are incompatible")
        .with_suggestion("convert with `int(x)`")
}

fn render(source: Option<(&FileUri, &str)>, diag: &Diagnostic) -> String {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        if let Some((file, text)) = source {
            emitter.add_source(file.clone(), text);
        }
        emitter.emit(diag);
        emitter.flush();
    }
    String::from_utf8(output).unwrap()
}

#[test]
fn test_terminal_emitter_no_color() {
    let text = render(None, &sample_diagnostic());
    assert!(text.starts_with("error[E2001]: type mismatch"));
    assert!(text.contains("--> 10..15: expected `int`"));
    assert!(text.contains("= note: int and string are incompatible"));
    assert!(text.contains("= help: convert with `int(x)`"));
    assert!(!text.contains("\x1b["));
}

#[test]
fn test_terminal_emitter_with_color() {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Always, false);
        emitter.emit(&sample_diagnostic());
    }
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\x1b["));
    assert!(text.contains("E2001"));
}

#[test]
fn test_snippet_with_registered_source() {
    let file = FileUri::new("mem:main.br");
    let diag = Diagnostic::error(ErrorCode::E2011)
        .with_message("function `fo` not found")
        .with_file(file.clone())
        .with_label(Span::new(15, 17), "not found");
    let text = render(Some((&file, "let a = 1;\nx = fo(a);\n")), &diag);
    assert!(text.contains("--> mem:main.br:2:5"));
    assert!(text.contains("2 | x = fo(a);"));
    assert!(text.contains(" |     ^^ not found"));
}

#[test]
fn test_causes_are_indented() {
    let diag = sample_diagnostic().with_cause(
        Diagnostic::note(ErrorCode::E2012).with_message("candidate `f(float)` rejected"),
    );
    let text = render(None, &diag);
    assert!(text.contains("\n  note[E2012]: candidate `f(float)` rejected"));
}

#[test]
fn test_summary() {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(2, 1);
        emitter.emit_summary(0, 3);
    }
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("error: aborting due to 2 previous errors; 1 warning emitted"));
    assert!(text.contains("warning: 3 warnings emitted"));
}

#[test]
fn test_color_mode_parse() {
    assert_eq!(ColorMode::parse("always"), Some(ColorMode::Always));
    assert_eq!(ColorMode::parse("rainbow"), None);
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Auto.should_use_colors(true));
}

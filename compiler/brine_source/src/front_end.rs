//! Tokenizer and parser as seen by the loader.

use brine_diagnostic::DiagnosticSink;
use brine_ir::{FileUri, SourceAst, TokenList};
use brine_lexer::PreprocessorVars;

/// Turns file text into tokens and a syntax tree.
///
/// The loader only needs the `using` directives of the tree; everything
/// else is carried through to later phases untouched.
pub trait FrontEnd {
    fn tokenize(
        &self,
        text: &str,
        diagnostics: &mut DiagnosticSink,
        vars: &PreprocessorVars,
        file: &FileUri,
    ) -> TokenList;

    fn parse(
        &self,
        tokens: &TokenList,
        file: &FileUri,
        diagnostics: &mut DiagnosticSink,
    ) -> SourceAst;
}

/// The brine lexer and parser.
#[derive(Copy, Clone, Debug, Default)]
pub struct BrineFrontEnd;

impl FrontEnd for BrineFrontEnd {
    fn tokenize(
        &self,
        text: &str,
        diagnostics: &mut DiagnosticSink,
        vars: &PreprocessorVars,
        file: &FileUri,
    ) -> TokenList {
        brine_lexer::lex(text, diagnostics, vars, file)
    }

    fn parse(
        &self,
        tokens: &TokenList,
        file: &FileUri,
        diagnostics: &mut DiagnosticSink,
    ) -> SourceAst {
        let result = brine_parse::parse(tokens);
        diagnostics.extend(result.diagnostics(file));
        result.ast
    }
}

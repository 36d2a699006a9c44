//! Type parsing: `NAME`, `NAME<args>` and `[T]`.

use brine_diagnostic::ErrorCode;
use brine_ir::{TokenKind, TypeExpr};

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        if self.cursor.check(&TokenKind::LBracket) {
            let start = self.cursor.advance().span;
            let elem = self.parse_type()?;
            let end = self.cursor.expect(&TokenKind::RBracket)?.span;
            return Ok(TypeExpr::Array {
                elem: Box::new(elem),
                span: start.merge(end),
            });
        }

        if !self.cursor.check_ident() {
            let token = self.cursor.current();
            return Err(ParseError::new(
                ErrorCode::E1005,
                format!("expected type, found {}", token.kind.describe()),
                token.span,
            )
            .with_context("expected a type"));
        }

        let name = self.cursor.expect_ident()?;
        let mut args = Vec::new();
        if self.cursor.eat(&TokenKind::Lt) {
            while !self.cursor.check(&TokenKind::Gt) {
                args.push(self.parse_type()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.cursor.expect(&TokenKind::Gt)?;
        }
        Ok(TypeExpr::Named { name, args })
    }
}

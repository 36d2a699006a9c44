//! Statements and blocks.

use brine_diagnostic::ErrorCode;
use brine_ir::{Block, Ident, Stmt, StmtKind, TokenKind};

use crate::{recovery::RecoverySet, ParseError, Parser};

impl Parser<'_> {
    /// `{ stmt* }`
    ///
    /// Errors inside the block are recorded and skipped; only a missing
    /// closing brace fails the block itself.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            let before = self.cursor.position();
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => self.recover(e, RecoverySet::StmtBoundary),
            }
            if self.cursor.position() == before {
                self.cursor.advance();
            }
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?.span;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Let => {
                self.cursor.advance();
                let name = self.cursor.expect_ident()?;
                let ty = if self.cursor.eat(&TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                self.cursor.expect(&TokenKind::Eq)?;
                let value = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Let { name, ty, value }
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::Label(name) => {
                let label = Ident::new(name.clone(), start);
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Colon)?;
                if !self.cursor.check(&TokenKind::While) {
                    return Err(ParseError::new(
                        ErrorCode::E1001,
                        format!(
                            "expected `while` after label, found {}",
                            self.cursor.current_kind().describe()
                        ),
                        self.cursor.current_span(),
                    )
                    .with_context("only loops can be labeled"));
                }
                self.parse_while(Some(label))?
            }
            TokenKind::While => self.parse_while(None)?,
            TokenKind::Break => {
                self.cursor.advance();
                let token = self.cursor.current();
                let label = if let TokenKind::Label(name) = &token.kind {
                    self.cursor.advance();
                    Some(Ident::new(name.clone(), token.span))
                } else {
                    None
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Break(label)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt {
            kind,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    fn parse_while(&mut self, label: Option<Ident>) -> Result<StmtKind, ParseError> {
        self.cursor.expect(&TokenKind::While)?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(StmtKind::While { label, cond, body })
    }
}

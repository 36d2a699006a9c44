//! Expression parsing.
//!
//! Binary operators use precedence climbing over [`BinaryOp::precedence`];
//! all binary operators are left-associative.

use brine_diagnostic::expected_expression;
use brine_ir::{BinaryOp, Expr, ExprKind, Ident, TokenKind};

use crate::{ParseError, Parser};

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::GtEq => BinaryOp::GtEq,
        _ => return None,
    })
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_postfix()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            if op.precedence() < min_precedence {
                break;
            }
            let op_span = self.cursor.advance().span;
            let rhs = self.parse_binary(op.precedence() + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    op_span,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// `primary ( .name | .name(args) )*`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.cursor.eat(&TokenKind::Dot) {
            let name = self.cursor.expect_ident()?;
            if self.cursor.check(&TokenKind::LParen) {
                let args = self.parse_args()?;
                let span = expr.span.merge(self.cursor.previous_span());
                expr = Expr::new(
                    ExprKind::MethodCall {
                        receiver: Box::new(expr),
                        method: name,
                        args,
                    },
                    span,
                );
            } else {
                let span = expr.span.merge(name.span);
                expr = Expr::new(
                    ExprKind::Field {
                        base: Box::new(expr),
                        field: name,
                    },
                    span,
                );
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        let kind = match &token.kind {
            TokenKind::Int(v) => ExprKind::Int(*v),
            TokenKind::Float(v) => ExprKind::Float(*v),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Minus => return self.parse_negative_literal(),
            TokenKind::Ident(name) => {
                self.cursor.advance();
                let ident = Ident::new(name.clone(), span);
                if self.cursor.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    return Ok(Expr::new(
                        ExprKind::Call {
                            callee: ident,
                            args,
                        },
                        span.merge(self.cursor.previous_span()),
                    ));
                }
                return Ok(Expr::new(ExprKind::Name(ident), span));
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let mut inner = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::RParen)?.span;
                inner.span = span.merge(end);
                return Ok(inner);
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let mut elems = Vec::new();
                while !self.cursor.check(&TokenKind::RBracket) {
                    elems.push(self.parse_expr()?);
                    if !self.cursor.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.cursor.expect(&TokenKind::RBracket)?.span;
                return Ok(Expr::new(ExprKind::Array(elems), span.merge(end)));
            }
            other => {
                let diag = expected_expression(span, &other.describe());
                return Err(ParseError::new(diag.code, diag.message, span)
                    .with_context("expected expression here"));
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, span))
    }

    /// `-` directly in front of a number literal.
    fn parse_negative_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.advance().span;
        let token = self.cursor.current();
        let kind = match &token.kind {
            TokenKind::Int(v) => ExprKind::Int(-*v),
            TokenKind::Float(v) => ExprKind::Float(-*v),
            other => {
                let diag = expected_expression(token.span, &other.describe());
                return Err(ParseError::new(diag.code, diag.message, token.span)
                    .with_context("only number literals can be negated"));
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, start.merge(token.span)))
    }

    /// `( expr, .. )`
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(args)
    }
}

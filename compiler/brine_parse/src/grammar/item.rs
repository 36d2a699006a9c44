//! Declarations: `using`, functions, methods, operators, structs and aliases.

use brine_diagnostic::ErrorCode;
use brine_ir::{
    AliasDecl, DeclKind, FieldDecl, FunctionDecl, Ident, Item, ParamDecl, StructDecl, TokenKind,
    UsingDirective,
};

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// `using "path";`
    pub(crate) fn parse_using(&mut self) -> Result<UsingDirective, ParseError> {
        let start = self.cursor.expect(&TokenKind::Using)?.span;
        let token = self.cursor.current();
        let TokenKind::Str(path) = &token.kind else {
            return Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected import path string, found {}",
                    token.kind.describe()
                ),
                token.span,
            )
            .with_context("expected a string such as \"std:core\""));
        };
        self.cursor.advance();
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(UsingDirective::new(
            path.clone(),
            start.merge(self.cursor.previous_span()),
        ))
    }

    pub(crate) fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Struct => self.parse_struct().map(Item::Struct),
            TokenKind::Alias => self.parse_alias().map(Item::Alias),
            _ => self.parse_function().map(Item::Function),
        }
    }

    /// `[extern] (fn|method|operator) NAME<T, ..>(params) [-> T] (block | ;)`
    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let start = self.cursor.current_span();
        let is_extern = self.cursor.eat(&TokenKind::Extern);

        let kind = match self.cursor.current_kind() {
            TokenKind::Fn => DeclKind::Function,
            TokenKind::Method => DeclKind::Method,
            TokenKind::Operator => DeclKind::Operator,
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!(
                        "expected `fn`, `method` or `operator`, found {}",
                        other.describe()
                    ),
                    self.cursor.current_span(),
                ))
            }
        };
        self.cursor.advance();

        let name = if kind == DeclKind::Operator {
            let token = self.cursor.current();
            let Some(symbol) = token.kind.operator_symbol() else {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    format!("expected operator symbol, found {}", token.kind.describe()),
                    token.span,
                )
                .with_context("expected one of + - * / == != < > <= >="));
            };
            self.cursor.advance();
            Ident::new(symbol, token.span)
        } else {
            self.cursor.expect_ident()?
        };

        let type_params = self.parse_type_params()?;

        self.cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            params.push(self.parse_param()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        if kind == DeclKind::Method && params.is_empty() {
            return Err(ParseError::new(
                ErrorCode::E1001,
                format!("method `{}` needs a receiver parameter", name.name),
                name.span,
            )
            .with_context("the first parameter is the receiver"));
        }

        let ret = if self.cursor.eat(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.cursor.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.cursor.expect(&TokenKind::Semicolon)?;
            if !is_extern {
                self.errors.push(
                    ParseError::new(
                        ErrorCode::E1007,
                        format!("`{}` has no body", name.name),
                        name.span,
                    )
                    .with_context("only `extern` declarations may omit the body"),
                );
            }
            None
        };

        Ok(FunctionDecl {
            kind,
            name,
            type_params,
            params,
            ret,
            body,
            is_extern,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `name: T [= default]`
    fn parse_param(&mut self) -> Result<ParamDecl, ParseError> {
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let default = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(ParamDecl { name, ty, default })
    }

    /// Optional `<T, U>` list of type parameter names.
    fn parse_type_params(&mut self) -> Result<Vec<Ident>, ParseError> {
        let mut params = Vec::new();
        if !self.cursor.eat(&TokenKind::Lt) {
            return Ok(params);
        }
        while !self.cursor.check(&TokenKind::Gt) {
            params.push(self.cursor.expect_ident()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::Gt)?;
        Ok(params)
    }

    /// `struct NAME<T> { field: T, .. }`
    fn parse_struct(&mut self) -> Result<StructDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Struct)?.span;
        let name = self.cursor.expect_ident()?;
        let type_params = self.parse_type_params()?;

        self.cursor.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let field = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl { name: field, ty });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;

        Ok(StructDecl {
            name,
            type_params,
            fields,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `alias NAME = type;`
    fn parse_alias(&mut self) -> Result<AliasDecl, ParseError> {
        let start = self.cursor.expect(&TokenKind::Alias)?.span;
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(AliasDecl {
            name,
            ty,
            span: start.merge(self.cursor.previous_span()),
        })
    }
}

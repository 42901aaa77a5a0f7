//! Program and statement parsing.

use crate::parser::Parser;
use coocoo_lexer::token::TokenKind;
use coocoo_types::ast::*;
use coocoo_types::ErrorCode;

impl<'src> Parser<'src> {
    /// `program := stmt* EOF`
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        let span = start.merge(self.previous_span());
        Program { stmts, span }
    }

    /// Parse a single statement, including its `;`.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        let lookahead = (self.peek_kind().clone(), self.look_ahead(1).clone());
        match lookahead {
            (TokenKind::Export, _) => self.parse_export().map(Stmt::Export),
            (TokenKind::LParen, _) => self.parse_channel_decl().map(Stmt::Channel),
            (TokenKind::Identifier(_), TokenKind::Eq) => self.parse_binding().map(Stmt::Bind),
            (other, _) => {
                let message = format!(
                    "expected a binding, a material channel or 'export', got '{other}'"
                );
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// `name = expr;`
    fn parse_binding(&mut self) -> Option<BindStmt> {
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        let span = name.span.merge(self.previous_span());
        Some(BindStmt { name, value, span })
    }

    /// `(material, channel, MaterialType) = expr;`
    fn parse_channel_decl(&mut self) -> Option<ChannelDecl> {
        let start = self.advance(); // eat `(`
        let material = self.expect_identifier()?;
        self.expect(&TokenKind::Comma)?;
        let channel = self.expect_identifier()?;
        self.expect(&TokenKind::Comma)?;
        let material_type = self.expect_identifier()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(ChannelDecl {
            material,
            channel,
            material_type,
            value,
            span,
        })
    }

    /// `export a, b;`
    fn parse_export(&mut self) -> Option<ExportStmt> {
        let start = self.advance(); // eat `export`
        let mut names = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(ExportStmt { names, span })
    }
}

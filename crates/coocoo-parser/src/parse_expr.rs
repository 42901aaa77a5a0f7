//! Expression parsing: calls, identifiers and integer literals.

use coocoo_lexer::token::TokenKind;
use coocoo_types::ast::*;
use coocoo_types::ErrorCode;

use crate::parser::{Parser, MAX_EXPR_DEPTH};

impl<'src> Parser<'src> {
    /// Parse an expression, enforcing the nesting limit.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_primary();
        self.expr_depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(_) if *self.look_ahead(1) == TokenKind::LParen => {
                self.parse_call()
            }
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(Expr::new(ExprKind::Ident(name), span))
            }
            TokenKind::NumberLit(_) | TokenKind::Minus => self.parse_number(),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// `[-] INTEGER`, folded into a signed 32-bit value.
    fn parse_number(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let negative = self.eat(&TokenKind::Minus);
        let TokenKind::NumberLit(magnitude) = *self.peek_kind() else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected number after '-', got '{}'", self.peek_kind()),
            );
            return None;
        };
        let end = self.advance();
        let span = start.merge(end);

        let signed = if negative {
            -i64::from(magnitude)
        } else {
            i64::from(magnitude)
        };
        match i32::try_from(signed) {
            Ok(value) => Some(Expr::new(ExprKind::Number(value), span)),
            Err(_) => {
                self.error_at(
                    ErrorCode::INVALID_NUMBER,
                    format!("number literal {signed} does not fit in a 32-bit integer"),
                    span,
                );
                None
            }
        }
    }

    /// `name(args...)`
    fn parse_call(&mut self) -> Option<Expr> {
        let callee = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check_exact(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let span = callee.span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Call { callee, args }, span))
    }
}

//! Recursive-descent parser for math expressions.
//!
//! Precedence follows the original operator table: add/subtract bind loosest,
//! then multiply/divide/modulo, then power (`^` and its `**` alias); the
//! postfix factorials bind tightest. Binary operators associate left.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{MagnitudeError, Result};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Parser::new(tokens))
    }

    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.expression()?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.error_here("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr> {
        self.additive()
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut expr = self.multiplicative()?;
        loop {
            let op = if self.match_token(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_token(&TokenKind::Minus) {
                BinaryOp::Subtract
            } else {
                break;
            };
            let right = self.multiplicative()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut expr = self.power()?;
        loop {
            let op = if self.match_token(&TokenKind::Star) {
                BinaryOp::Multiply
            } else if self.match_token(&TokenKind::Slash) {
                BinaryOp::Divide
            } else if self.match_token(&TokenKind::Percent) {
                BinaryOp::Modulo
            } else {
                break;
            };
            let right = self.power()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;
        while self.match_token(&TokenKind::Caret) || self.match_token(&TokenKind::StarStar) {
            let right = self.unary()?;
            expr = Expr::binary(BinaryOp::Power, expr, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_token(&TokenKind::Minus) {
            let operand = self.unary()?;
            return Ok(Expr::unary(UnaryOp::Negate, operand));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_token(&TokenKind::Bang) {
                expr = Expr::unary(UnaryOp::Factorial, expr);
            } else if self.match_token(&TokenKind::BangBang) {
                expr = Expr::unary(UnaryOp::DoubleFactorial, expr);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_token(&TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.expect(&TokenKind::RightParen, "expected `)`")?;
            return Ok(expr);
        }

        let token = self.advance().clone();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::number(value)),
            TokenKind::Identifier(name) => {
                self.expect(&TokenKind::LeftParen, "expected `(` after function name")?;
                let args = self.arguments()?;
                Ok(Expr::call(name, args))
            }
            _ => Err(MagnitudeError::Parse {
                message: format!("unexpected token {:?}", token.kind),
                position: token.position,
            }),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.match_token(&TokenKind::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.match_token(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RightParen, "expected `,` or `)` in arguments")?;
            break;
        }
        Ok(args)
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<()> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: &str) -> MagnitudeError {
        MagnitudeError::Parse {
            message: message.to_string(),
            position: self.peek().position,
        }
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn peek(&self) -> &Token {
        // the token stream always ends in Eof
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.current.min(self.tokens.len() - 1)];
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }
}

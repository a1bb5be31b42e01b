//! Tokenizer for the math-expression surface.
//!
//! Number literals go through the full magnitude grammar, so `10^^5e2` is a
//! single token; a plain `^` stays the power operator.

use crate::error::{MagnitudeError, Result};
use crate::magnitude::Magnitude;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Magnitude),
    Identifier(String),

    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Caret,
    Percent,
    Bang,
    BangBang,

    LeftParen,
    RightParen,
    Comma,

    Eof,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            position: self.position,
        });
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let position = self.position;
        let c = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    position,
                })
            }
        };
        if c.is_ascii_digit() {
            return self.scan_number();
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }
        self.advance();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '%' => TokenKind::Percent,
            '!' => {
                if self.peek() == Some('!') {
                    self.advance();
                    TokenKind::BangBang
                } else {
                    TokenKind::Bang
                }
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            other => {
                return Err(MagnitudeError::Parse {
                    message: format!("unexpected character `{other}`"),
                    position,
                })
            }
        };
        Ok(Token { kind, position })
    }

    fn scan_number(&mut self) -> Result<Token> {
        let start = self.position;
        self.consume_digits();

        // `10` followed by a tower or ultra marker is a magnitude literal
        let tower_marker = self.peek() == Some('#')
            || (self.peek() == Some('^') && self.peek_next() == Some('^'));
        if self.slice_from(start) == "10" && tower_marker {
            return self.scan_magnitude(start);
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.position;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.consume_digits();
            } else {
                // the `e` starts an identifier, not an exponent
                self.position = mark;
            }
        }

        let text = self.slice_from(start);
        let value: f64 = text.parse().map_err(|_| MagnitudeError::Parse {
            message: format!("invalid number literal `{text}`"),
            position: start,
        })?;
        Ok(Token {
            kind: TokenKind::Number(Magnitude::from_f64(value)),
            position: start,
        })
    }

    /// Consumes the remainder of a `10^^...` / `10#k^^...` / `10##k^^...`
    /// literal and validates it through the magnitude parser.
    fn scan_magnitude(&mut self, start: usize) -> Result<Token> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_digit() || c == '.' || c == '#' => {
                    self.advance();
                }
                Some('e' | 'E') => {
                    self.advance();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.advance();
                    }
                }
                Some('^') if self.peek_next() == Some('^') => {
                    self.advance();
                    self.advance();
                    if self.peek() == Some('-') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        let text = self.slice_from(start);
        let value: Magnitude = text.parse()?;
        Ok(Token {
            kind: TokenKind::Number(value),
            position: start,
        })
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.position;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token {
            kind: TokenKind::Identifier(self.slice_from(start)),
            position: start,
        }
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn slice_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize_string(input: &str) -> Result<Vec<TokenKind>> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        Ok(tokens.into_iter().map(|t| t.kind).collect())
    }

    #[test]
    fn test_integer_literals() {
        let result = tokenize_string("42").unwrap();
        assert_eq!(
            result,
            vec![TokenKind::Number(Magnitude::from_f64(42.0)), TokenKind::Eof]
        );
    }

    #[test]
    fn test_real_and_scientific_literals() {
        let result = tokenize_string("3.14").unwrap();
        assert_eq!(
            result,
            vec![TokenKind::Number(Magnitude::from_f64(3.14)), TokenKind::Eof]
        );

        let result = tokenize_string("1.5e3").unwrap();
        assert_eq!(
            result,
            vec![TokenKind::Number("1.5e3".parse().unwrap()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_tower_literals() {
        let result = tokenize_string("10^^5e2").unwrap();
        assert_eq!(
            result,
            vec![TokenKind::Number("10^^5e2".parse().unwrap()), TokenKind::Eof]
        );

        let result = tokenize_string("10##2^^10^^1e5").unwrap();
        assert_eq!(
            result,
            vec![
                TokenKind::Number("10##2^^10^^1e5".parse().unwrap()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_plain_ten_is_not_a_tower() {
        let result = tokenize_string("10 ^ 2").unwrap();
        assert_eq!(
            result,
            vec![
                TokenKind::Number(Magnitude::from_f64(10.0)),
                TokenKind::Caret,
                TokenKind::Number(Magnitude::from_f64(2.0)),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators() {
        let result = tokenize_string("+ - * / ^ % ** ! !!").unwrap();
        assert_eq!(
            result,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Caret,
                TokenKind::Percent,
                TokenKind::StarStar,
                TokenKind::Bang,
                TokenKind::BangBang,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_function_call_shape() {
        let result = tokenize_string("pow(2, 10)").unwrap();
        assert_eq!(
            result,
            vec![
                TokenKind::Identifier("pow".to_string()),
                TokenKind::LeftParen,
                TokenKind::Number(Magnitude::from_f64(2.0)),
                TokenKind::Comma,
                TokenKind::Number(Magnitude::from_f64(10.0)),
                TokenKind::RightParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize_string("2 @ 3").unwrap_err();
        assert!(matches!(err, MagnitudeError::Parse { position: 2, .. }));
    }
}

//! Token expectation layer over the tokenizer.
//!
//! Every `expect_*` call consumes exactly one token and either returns it
//! or fails with a syntax error naming what was expected and what was
//! found. This is the sole error surface for syntax errors; the first one
//! aborts the whole translation unit.

use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token};
use crate::tokenizer::Tokenizer;

pub struct TokenValidator<'a> {
    tokens: Tokenizer<'a>,
    last_span: Span,
}

impl<'a> TokenValidator<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            last_span: Span::new(0, 0, 1, 1),
        }
    }

    pub fn source(&self) -> &'a str {
        self.tokens.source()
    }

    pub fn peek_token(&mut self) -> Result<Option<&Token>> {
        Ok(self.tokens.peek()?.map(|t| &t.token))
    }

    pub fn peek_keyword(&mut self) -> Result<Option<Keyword>> {
        Ok(match self.peek_token()? {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        })
    }

    pub fn peek_symbol(&mut self) -> Result<Option<char>> {
        Ok(match self.peek_token()? {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        })
    }

    /// The span of the next token, or of the last consumed token at end of
    /// input (so end-of-file errors still point somewhere useful).
    pub fn current_span(&mut self) -> Result<Span> {
        Ok(match self.tokens.peek()? {
            Some(t) => t.span.clone(),
            None => self.last_span.clone(),
        })
    }

    pub fn advance(&mut self) -> Result<Option<SpannedToken>> {
        let token = self.tokens.advance()?;
        if let Some(t) = &token {
            self.last_span = t.span.clone();
        }
        Ok(token)
    }

    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.tokens.peek()?.is_none())
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<Span> {
        match self.peek_keyword()? {
            Some(k) if k == keyword => {
                let t = self.advance()?.ok_or_else(|| self.eof_error())?;
                Ok(t.span)
            }
            _ => Err(self.mismatch(&format!("keyword '{}'", keyword.as_str()))),
        }
    }

    /// Consumes the next token if it is one of the given keywords.
    pub fn expect_keyword_of(&mut self, keywords: &[Keyword]) -> Result<(Keyword, Span)> {
        if let Some(k) = self.peek_keyword()?
            && keywords.contains(&k)
        {
            let t = self.advance()?.ok_or_else(|| self.eof_error())?;
            return Ok((k, t.span));
        }
        let expected = keywords
            .iter()
            .map(|k| format!("'{}'", k.as_str()))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(self.mismatch(&expected))
    }

    pub fn expect_symbol(&mut self, symbol: char) -> Result<Span> {
        match self.peek_symbol()? {
            Some(c) if c == symbol => {
                let t = self.advance()?.ok_or_else(|| self.eof_error())?;
                Ok(t.span)
            }
            _ => Err(self.mismatch(&format!("'{symbol}'"))),
        }
    }

    pub fn expect_identifier(&mut self) -> Result<(String, Span)> {
        match self.peek_token()? {
            Some(Token::Identifier(_)) => {
                let t = self.advance()?.ok_or_else(|| self.eof_error())?;
                match t.token {
                    Token::Identifier(name) => Ok((name, t.span)),
                    _ => unreachable!("peeked token changed between peek and advance"),
                }
            }
            _ => Err(self.mismatch("identifier")),
        }
    }

    fn mismatch(&mut self, expected: &str) -> CompileError {
        let got = match self.tokens.peek() {
            Ok(Some(t)) => t.token.to_string(),
            _ => "end of file".to_string(),
        };
        let span = match self.tokens.peek() {
            Ok(Some(t)) => t.span.clone(),
            _ => self.last_span.clone(),
        };
        CompileError::syntax(format!("expected {expected}, got {got}"), span)
    }

    fn eof_error(&self) -> CompileError {
        CompileError::syntax("unexpected end of file", self.last_span.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_keyword_consumes() {
        let mut v = TokenValidator::new("class Main");
        let span = v.expect_keyword(Keyword::Class).unwrap();
        assert_eq!(span.column, 1);
        let (name, _) = v.expect_identifier().unwrap();
        assert_eq!(name, "Main");
        assert!(v.at_end().unwrap());
    }

    #[test]
    fn test_expect_keyword_mismatch_names_both_sides() {
        let mut v = TokenValidator::new("Main");
        let err = v.expect_keyword(Keyword::Class).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expected keyword 'class'"), "{msg}");
        assert!(msg.contains("identifier 'Main'"), "{msg}");
    }

    #[test]
    fn test_expect_symbol() {
        let mut v = TokenValidator::new("{ }");
        v.expect_symbol('{').unwrap();
        let err = v.expect_symbol(';').unwrap_err();
        assert!(err.to_string().contains("expected ';'"));
    }

    #[test]
    fn test_expect_keyword_of() {
        let mut v = TokenValidator::new("field static var");
        let (k, _) = v
            .expect_keyword_of(&[Keyword::Static, Keyword::Field])
            .unwrap();
        assert_eq!(k, Keyword::Field);
        let (k, _) = v
            .expect_keyword_of(&[Keyword::Static, Keyword::Field])
            .unwrap();
        assert_eq!(k, Keyword::Static);
        let err = v
            .expect_keyword_of(&[Keyword::Static, Keyword::Field])
            .unwrap_err();
        assert!(err.to_string().contains("'static' or 'field'"));
    }

    #[test]
    fn test_end_of_file_error_uses_last_span() {
        let mut v = TokenValidator::new("class");
        v.expect_keyword(Keyword::Class).unwrap();
        let err = v.expect_identifier().unwrap_err();
        assert!(err.to_string().contains("end of file"));
        assert_eq!(err.span().unwrap().line, 1);
    }

    #[test]
    fn test_lexical_error_propagates() {
        let mut v = TokenValidator::new("\"unterminated");
        assert!(matches!(
            v.peek_token(),
            Err(CompileError::UnterminatedString { .. })
        ));
    }
}

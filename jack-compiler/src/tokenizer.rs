//! Lazy tokenizer for the Jack language.
//!
//! Produces tokens on demand with one-token lookahead (`peek`) independent
//! of consumption (`advance`). The first lexical error aborts tokenization
//! of the file; there is no recovery.

use crate::error::{CompileError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token, is_symbol};

/// Largest value a Jack integer literal may hold (15-bit constant limit).
const MAX_INT: u32 = 32767;

pub struct Tokenizer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    byte_offset: usize,
    line: usize,
    column: usize,
    peeked: Option<SpannedToken>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            byte_offset: 0,
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&SpannedToken>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume and return the next token; `None` at end of input.
    pub fn advance(&mut self) -> Result<Option<SpannedToken>> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.scan_token()
    }

    /// The full source text, for diagnostic rendering.
    pub fn source(&self) -> &'a str {
        self.source
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next_char(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        self.byte_offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn position(&self) -> (usize, usize, usize) {
        (self.byte_offset, self.line, self.column)
    }

    fn scan_token(&mut self) -> Result<Option<SpannedToken>> {
        self.skip_trivia()?;

        let (start, line, column) = self.position();
        let Some(c) = self.current() else {
            return Ok(None);
        };

        let token = if is_symbol(c) {
            self.bump();
            Token::Symbol(c)
        } else if c.is_ascii_digit() {
            self.read_integer()?
        } else if c == '"' {
            self.read_string()?
        } else if c.is_ascii_alphabetic() || c == '_' {
            self.read_word()
        } else {
            return Err(CompileError::UnexpectedCharacter {
                ch: c,
                span: Span::new(start, start + c.len_utf8(), line, column),
            });
        };

        let span = Span::new(start, self.byte_offset, line, column);
        Ok(Some(SpannedToken { token, span }))
    }

    /// Skips whitespace, line comments, and block comments. Block comments
    /// nest; an unclosed one is fatal, reported at its opening position.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.current(), self.next_char()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (start, line, column) = self.position();
                    self.bump();
                    self.bump();
                    let mut depth = 1usize;
                    loop {
                        match (self.current(), self.next_char()) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            (Some('/'), Some('*')) => {
                                self.bump();
                                self.bump();
                                depth += 1;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(CompileError::UnterminatedComment {
                                    span: Span::new(start, start + 2, line, column),
                                });
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_integer(&mut self) -> Result<Token> {
        let (start, line, column) = self.position();
        let mut literal = String::new();
        while let Some(c) = self.current() {
            if !c.is_ascii_digit() {
                break;
            }
            literal.push(c);
            self.bump();
        }
        // u32 cannot overflow within Jack's practical literal lengths, but a
        // pathological digit run still has to fail cleanly.
        match literal.parse::<u32>() {
            Ok(value) if value <= MAX_INT => Ok(Token::IntegerConstant(value as u16)),
            _ => Err(CompileError::IntegerOutOfRange {
                span: Span::new(start, self.byte_offset, line, column),
                literal,
            }),
        }
    }

    fn read_string(&mut self) -> Result<Token> {
        let (start, line, column) = self.position();
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.current() {
                Some('"') => {
                    self.bump();
                    return Ok(Token::StringConstant(value));
                }
                Some('\n') | None => {
                    return Err(CompileError::UnterminatedString {
                        span: Span::new(start, start + 1, line, column),
                    });
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            word.push(c);
            self.bump();
        }
        match Keyword::parse(&word) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        let mut out = Vec::new();
        while let Some(t) = tokenizer.advance().unwrap() {
            out.push(t.token);
        }
        out
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").is_empty());
        assert!(tokens("   \n\t  ").is_empty());
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            tokens("class Main classify"),
            vec![
                Token::Keyword(Keyword::Class),
                Token::Identifier("Main".to_string()),
                Token::Identifier("classify".to_string()),
            ]
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            tokens("{(}~)"),
            vec![
                Token::Symbol('{'),
                Token::Symbol('('),
                Token::Symbol('}'),
                Token::Symbol('~'),
                Token::Symbol(')'),
            ]
        );
    }

    #[test]
    fn test_integer_literal() {
        assert_eq!(tokens("0 42 32767"), vec![
            Token::IntegerConstant(0),
            Token::IntegerConstant(42),
            Token::IntegerConstant(32767),
        ]);
    }

    #[test]
    fn test_integer_out_of_range() {
        let mut tokenizer = Tokenizer::new("let x = 32768;");
        // let, x, =
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        let err = tokenizer.advance().unwrap_err();
        assert!(matches!(err, CompileError::IntegerOutOfRange { .. }));
    }

    #[test]
    fn test_huge_digit_run_is_rejected() {
        let source = "99999999999999999999";
        let mut tokenizer = Tokenizer::new(source);
        assert!(matches!(
            tokenizer.advance(),
            Err(CompileError::IntegerOutOfRange { .. })
        ));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            tokens("\"hello world\""),
            vec![Token::StringConstant("hello world".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string_reports_start() {
        let mut tokenizer = Tokenizer::new("let s = \"oops\nreturn;");
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        match tokenizer.advance() {
            Err(CompileError::UnterminatedString { span }) => {
                assert_eq!(span.line, 1);
                assert_eq!(span.column, 9);
            }
            other => panic!("expected unterminated string, got {other:?}"),
        }
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(tokens("let // x = 5;\nreturn"), vec![
            Token::Keyword(Keyword::Let),
            Token::Keyword(Keyword::Return),
        ]);
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        assert_eq!(tokens("let /* one\ntwo\nthree */ return"), vec![
            Token::Keyword(Keyword::Let),
            Token::Keyword(Keyword::Return),
        ]);
    }

    #[test]
    fn test_nested_block_comment() {
        assert_eq!(tokens("/* outer /* inner */ still outer */ x"), vec![
            Token::Identifier("x".to_string()),
        ]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut tokenizer = Tokenizer::new("x /* never closed");
        tokenizer.advance().unwrap();
        match tokenizer.advance() {
            Err(CompileError::UnterminatedComment { span }) => {
                assert_eq!(span.column, 3);
            }
            other => panic!("expected unterminated comment, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_character() {
        let mut tokenizer = Tokenizer::new("let x = #;");
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        tokenizer.advance().unwrap();
        assert!(matches!(
            tokenizer.advance(),
            Err(CompileError::UnexpectedCharacter { ch: '#', .. })
        ));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut tokenizer = Tokenizer::new("class Main");
        assert_eq!(
            tokenizer.peek().unwrap().unwrap().token,
            Token::Keyword(Keyword::Class)
        );
        assert_eq!(
            tokenizer.peek().unwrap().unwrap().token,
            Token::Keyword(Keyword::Class)
        );
        assert_eq!(
            tokenizer.advance().unwrap().unwrap().token,
            Token::Keyword(Keyword::Class)
        );
        assert_eq!(
            tokenizer.advance().unwrap().unwrap().token,
            Token::Identifier("Main".to_string())
        );
        assert!(tokenizer.advance().unwrap().is_none());
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let mut tokenizer = Tokenizer::new("class\n  Main");
        let class = tokenizer.advance().unwrap().unwrap();
        assert_eq!((class.span.line, class.span.column), (1, 1));
        let main = tokenizer.advance().unwrap().unwrap();
        assert_eq!((main.span.line, main.span.column), (2, 3));
        assert_eq!(main.span.start, 8);
        assert_eq!(main.span.end, 12);
    }

    #[test]
    fn test_no_whitespace_between_tokens() {
        assert_eq!(tokens("x=y+1;"), vec![
            Token::Identifier("x".to_string()),
            Token::Symbol('='),
            Token::Identifier("y".to_string()),
            Token::Symbol('+'),
            Token::IntegerConstant(1),
            Token::Symbol(';'),
        ]);
    }
}

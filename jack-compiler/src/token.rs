//! Lexical tokens for the Jack language.

use std::fmt;

/// A half-open byte range in the source, with the 1-based line and column
/// of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token paired with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// A Jack lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(Keyword),
    Symbol(char),
    /// Integer literal, already range-checked to 0..=32767.
    IntegerConstant(u16),
    /// String literal with the quotes stripped.
    StringConstant(String),
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "keyword '{}'", k.as_str()),
            Token::Symbol(c) => write!(f, "'{c}'"),
            Token::IntegerConstant(n) => write!(f, "integer {n}"),
            Token::StringConstant(s) => write!(f, "string \"{s}\""),
            Token::Identifier(name) => write!(f, "identifier '{name}'"),
        }
    }
}

/// The reserved words of the Jack language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf::phf_map! {
    "class" => Keyword::Class,
    "constructor" => Keyword::Constructor,
    "function" => Keyword::Function,
    "method" => Keyword::Method,
    "field" => Keyword::Field,
    "static" => Keyword::Static,
    "var" => Keyword::Var,
    "int" => Keyword::Int,
    "char" => Keyword::Char,
    "boolean" => Keyword::Boolean,
    "void" => Keyword::Void,
    "true" => Keyword::True,
    "false" => Keyword::False,
    "null" => Keyword::Null,
    "this" => Keyword::This,
    "let" => Keyword::Let,
    "do" => Keyword::Do,
    "if" => Keyword::If,
    "else" => Keyword::Else,
    "while" => Keyword::While,
    "return" => Keyword::Return,
};

impl Keyword {
    /// Classify an identifier-shaped lexeme; `None` if it is not reserved.
    pub fn parse(s: &str) -> Option<Keyword> {
        KEYWORDS.get(s).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

/// The single-character symbols of the Jack grammar.
pub const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

pub fn is_symbol(c: char) -> bool {
    SYMBOLS.contains(&c)
}

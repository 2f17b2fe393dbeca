//! Error types and diagnostic rendering for the Jack compiler.
//!
//! One enum covers the whole stage: lexical, syntax, semantic, and I/O
//! failures. The compiler never recovers; the first error aborts the
//! translation unit (and, for semantic errors, the whole project).

use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;

use crate::token::Span;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("unterminated block comment starting at {span}")]
    UnterminatedComment { span: Span },

    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedCharacter { ch: char, span: Span },

    #[error("integer literal {literal} exceeds 32767 at {span}")]
    IntegerOutOfRange { literal: String, span: Span },

    #[error("{message} at {span}")]
    Syntax { message: String, span: Span },

    #[error("undeclared variable '{name}' at {span}")]
    UndeclaredVariable { name: String, span: Span },

    #[error("duplicate definition of '{name}' at {span}")]
    DuplicateDefinition { name: String, span: Span },

    #[error("duplicate class '{name}' at {span}")]
    DuplicateClass { name: String, span: Span },

    #[error("'this' cannot be referenced in a function at {span}")]
    ThisInFunction { span: Span },

    #[error("field '{name}' cannot be accessed from a function at {span}")]
    FieldInFunction { name: String, span: Span },

    #[error("unknown identifier '{name}' in call target at {span}")]
    UnknownCallTarget { name: String, span: Span },

    #[error("method '{name}' called without an instance receiver at {span}")]
    MethodWithoutReceiver { name: String, span: Span },

    #[error("{file}: {source}")]
    InFile {
        file: String,
        #[source]
        source: Box<CompileError>,
    },

    #[error("no .jack files found in {path}")]
    NoJackFiles { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn in_file(file: impl Into<String>, error: CompileError) -> Self {
        Self::InFile {
            file: file.into(),
            source: Box::new(error),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The source position this error points at, when it has one.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::UnterminatedString { span }
            | Self::UnterminatedComment { span }
            | Self::UnexpectedCharacter { span, .. }
            | Self::IntegerOutOfRange { span, .. }
            | Self::Syntax { span, .. }
            | Self::UndeclaredVariable { span, .. }
            | Self::DuplicateDefinition { span, .. }
            | Self::DuplicateClass { span, .. }
            | Self::ThisInFunction { span }
            | Self::FieldInFunction { span, .. }
            | Self::UnknownCallTarget { span, .. }
            | Self::MethodWithoutReceiver { span, .. } => Some(span),
            Self::InFile { source, .. } => source.span(),
            Self::NoJackFiles { .. } | Self::Io { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Renders an error against its source text: the message, the offending
/// line, and a caret under the column where the problem starts.
pub struct Diagnostic<'a> {
    file: &'a str,
    source: &'a str,
}

impl<'a> Diagnostic<'a> {
    pub fn new(file: &'a str, source: &'a str) -> Self {
        Self { file, source }
    }

    pub fn render(&self, error: &CompileError) -> String {
        let mut out = format!("{}: error: {error}", self.file);
        if let Some(span) = error.span()
            && let Some(text) = self.source.lines().nth(span.line.saturating_sub(1))
        {
            let pad = " ".repeat(span.column.saturating_sub(1));
            let _ = write!(out, "\n{:3} | {text}\n    | {pad}^", span.line);
        }
        out
    }
}

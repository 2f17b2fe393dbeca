//! Error types for stack-machine translation.
//!
//! All errors carry line number and filename for actionable messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmError {
    #[error("{file}:{line}: invalid command: {command}")]
    InvalidCommand {
        line: usize,
        file: String,
        command: String,
    },

    #[error("{file}:{line}: invalid segment: {segment}")]
    InvalidSegment {
        line: usize,
        file: String,
        segment: String,
    },

    #[error("{file}:{line}: cannot pop to constant segment")]
    PopToConstant { line: usize, file: String },

    #[error("{file}:{line}: invalid pointer index {index} (must be 0 or 1)")]
    InvalidPointerIndex {
        line: usize,
        file: String,
        index: u16,
    },

    #[error("{file}:{line}: invalid temp index {index} (must be 0-7)")]
    InvalidTempIndex {
        line: usize,
        file: String,
        index: u16,
    },

    #[error("{file}:{line}: missing argument for {command}")]
    MissingArgument {
        line: usize,
        file: String,
        command: String,
    },

    #[error("{file}:{line}: invalid number: {value}")]
    InvalidNumber {
        line: usize,
        file: String,
        value: String,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("no .vm files found in {path}")]
    NoVmFiles { path: String },
}

pub type Result<T> = std::result::Result<T, VmError>;

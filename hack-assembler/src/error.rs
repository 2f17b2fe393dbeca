use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("line {line}: invalid A-instruction value: {value} (must be 0..=32767)")]
    InvalidAValue { line: usize, value: String },

    #[error("line {line}: duplicate label: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: invalid instruction syntax: {text}")]
    InvalidSyntax { line: usize, text: String },

    #[error("line {line}: unknown dest mnemonic: {mnemonic}")]
    UnknownDest { line: usize, mnemonic: String },

    #[error("line {line}: unknown comp mnemonic: {mnemonic}")]
    UnknownComp { line: usize, mnemonic: String },

    #[error("line {line}: unknown jump mnemonic: {mnemonic}")]
    UnknownJump { line: usize, mnemonic: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AsmError>;

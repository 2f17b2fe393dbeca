use thiserror::Error;

/// Errors produced while loading or running a Hack program.
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot load '{path}': only .hack and .bin files are supported")]
    UnsupportedExtension { path: String },

    #[error("line {line}: malformed instruction word '{text}' (expected 16 binary digits)")]
    MalformedWord { line: usize, text: String },

    #[error("truncated program: {bytes} bytes is not a whole number of 16-bit words")]
    TruncatedProgram { bytes: usize },

    #[error("program of {words} words exceeds the 32768-word address space")]
    ProgramTooLarge { words: usize },

    #[error("illegal memory access at address {address} (pc {pc})")]
    IllegalMemoryAccess { address: u16, pc: u16 },

    #[error("illegal ALU computation code {code:#08b} (pc {pc})")]
    IllegalCompCode { code: u8, pc: u16 },
}

pub type Result<T> = std::result::Result<T, EmulatorError>;

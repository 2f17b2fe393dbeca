//! Pipeline errors.
//!
//! Each stage keeps its own error type; the driver wraps them so a failure
//! message always names the stage it came from.

use hack_assembler::error::AsmError;
use hack_emulator::EmulatorError;
use jack_compiler::CompileError;
use thiserror::Error;
use vm_translator::VmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("compile: {0}")]
    Compile(#[from] CompileError),

    #[error("translate: {0}")]
    Translate(#[from] VmError),

    #[error("assemble: {0}")]
    Assemble(#[from] AsmError),

    #[error("run: {0}")]
    Run(#[from] EmulatorError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_errors_name_their_stage() {
        let err = PipelineError::from(VmError::NoVmFiles {
            path: "empty".to_string(),
        });
        assert!(err.to_string().starts_with("translate: "));

        let err = PipelineError::from(EmulatorError::ProgramTooLarge { words: 40_000 });
        assert!(err.to_string().starts_with("run: "));
    }
}

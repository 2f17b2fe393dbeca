//! Emulator for the Hack 16-bit computer.
//!
//! Loads machine code produced by the assembler (`.hack` text or `.bin` raw
//! words) and executes it on a software model of the CPU: A and D registers,
//! a program counter, the 18-function ALU, and a 24577-word data memory with
//! the screen and keyboard mapped at the top.

pub mod cpu;
pub mod error;
pub mod loader;

pub use cpu::{Cpu, Compute, Instruction, KEYBOARD_ADDRESS, MEMORY_SIZE, SCREEN_ADDRESS, decode};
pub use error::{EmulatorError, Result};
pub use loader::{load_program, parse_bin, parse_hack};

use std::path::Path;

/// Loads a program file into a fresh machine, ready to run.
pub fn boot(path: &Path) -> Result<Cpu> {
    let words = load_program(path)?;
    let mut cpu = Cpu::new();
    cpu.load_program(words)?;
    Ok(cpu)
}

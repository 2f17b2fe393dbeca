//! Textual emitter for stack-machine VM commands.

use std::fmt::Write as _;

/// Accumulates VM commands for one class.
#[derive(Debug, Default)]
pub struct VmWriter {
    out: String,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: &str, index: u16) {
        let _ = writeln!(self.out, "push {segment} {index}");
    }

    pub fn pop(&mut self, segment: &str, index: u16) {
        let _ = writeln!(self.out, "pop {segment} {index}");
    }

    pub fn arithmetic(&mut self, command: &str) {
        let _ = writeln!(self.out, "{command}");
    }

    pub fn label(&mut self, label: &str) {
        let _ = writeln!(self.out, "label {label}");
    }

    pub fn goto(&mut self, label: &str) {
        let _ = writeln!(self.out, "goto {label}");
    }

    pub fn if_goto(&mut self, label: &str) {
        let _ = writeln!(self.out, "if-goto {label}");
    }

    pub fn function(&mut self, name: &str, locals: u16) {
        let _ = writeln!(self.out, "function {name} {locals}");
    }

    pub fn call(&mut self, name: &str, args: u16) {
        let _ = writeln!(self.out, "call {name} {args}");
    }

    pub fn ret(&mut self) {
        let _ = writeln!(self.out, "return");
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }
}

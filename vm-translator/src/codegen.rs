//! Hack assembly emission for the full stack-machine command set.
//!
//! One `CodeWriter` instance owns the output buffer and every counter that
//! must stay monotonic across translation units: the comparison-label counter
//! and the return-address counter. Sharing one writer across all files of a
//! program is what keeps the generated labels globally unique.

use std::fmt::Write;

use crate::memory::{SegmentAccess, pointer_symbol, segment_access, temp_address};
use crate::parser::{ArithmeticOp, Segment, VmCommand};

/// Stack pointer value installed by the bootstrap.
pub const STACK_BASE: u16 = 256;

pub struct CodeWriter {
    out: String,
    compare_counter: usize,
    return_counter: usize,
    /// Current file stem, used for static symbols and bare-file label scope.
    file_scope: String,
    /// Current function, used for label scoping and return labels.
    current_function: String,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            compare_counter: 0,
            return_counter: 0,
            file_scope: String::new(),
            current_function: String::new(),
        }
    }

    /// Switches to a new translation unit. Statics emitted afterwards are
    /// named `stem.index`; counters deliberately keep running.
    pub fn set_file(&mut self, stem: &str) {
        self.file_scope = stem.to_string();
    }

    pub fn current_function(&self) -> &str {
        &self.current_function
    }

    pub fn into_assembly(self) -> String {
        self.out
    }

    pub fn assembly(&self) -> &str {
        &self.out
    }

    pub fn write_command(&mut self, cmd: &VmCommand) {
        match cmd {
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Push { segment, index } => self.write_push(*segment, *index),
            VmCommand::Pop { segment, index } => self.write_pop(*segment, *index),
            VmCommand::Label { name } => {
                let scoped = self.scoped_label(name);
                let _ = writeln!(self.out, "({scoped})");
            }
            VmCommand::Goto { label } => {
                let scoped = self.scoped_label(label);
                let _ = writeln!(self.out, "@{scoped}\n0;JMP");
            }
            VmCommand::IfGoto { label } => {
                let scoped = self.scoped_label(label);
                let _ = writeln!(self.out, "@SP\nAM=M-1\nD=M\n@{scoped}\nD;JNE");
            }
            VmCommand::Function { name, num_locals } => self.write_function(name, *num_locals),
            VmCommand::Call { name, num_args } => self.write_call(name, *num_args),
            VmCommand::Return => self.write_return(),
        }
    }

    /// Program prologue: SP = 256, `call Sys.init 0`, and a halt sentinel in
    /// case the entry function ever returns.
    pub fn write_bootstrap(&mut self) {
        let _ = writeln!(self.out, "@{STACK_BASE}\nD=A\n@SP\nM=D");
        self.emit_call("Sys.init", 0, "Sys.init$ret.BOOTSTRAP");
        let _ = writeln!(self.out, "(HALT)\n@HALT\n0;JMP");
    }

    // --- arithmetic ---------------------------------------------------------

    fn write_arithmetic(&mut self, op: ArithmeticOp) {
        match op {
            ArithmeticOp::Add => self.write_binary("D+M"),
            ArithmeticOp::Sub => self.write_binary("M-D"),
            ArithmeticOp::And => self.write_binary("D&M"),
            ArithmeticOp::Or => self.write_binary("D|M"),
            ArithmeticOp::Neg => self.write_unary("-M"),
            ArithmeticOp::Not => self.write_unary("!M"),
            ArithmeticOp::Eq => self.write_comparison("JEQ"),
            ArithmeticOp::Lt => self.write_comparison("JLT"),
            ArithmeticOp::Gt => self.write_comparison("JGT"),
        }
    }

    // Pop y into D, apply `x op y` to the new top of stack in place.
    fn write_binary(&mut self, computation: &str) {
        let _ = writeln!(self.out, "@SP\nAM=M-1\nD=M\nA=A-1\nM={computation}");
    }

    fn write_unary(&mut self, computation: &str) {
        let _ = writeln!(self.out, "@SP\nA=M-1\nM={computation}");
    }

    // x-y decides the jump; true leaves -1 on the stack, false leaves 0.
    fn write_comparison(&mut self, jump: &str) {
        let n = self.compare_counter;
        self.compare_counter += 1;
        let _ = writeln!(
            self.out,
            "@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\n\
             @CMP_TRUE_{n}\nD;{jump}\n\
             @SP\nA=M-1\nM=0\n\
             @CMP_END_{n}\n0;JMP\n\
             (CMP_TRUE_{n})\n@SP\nA=M-1\nM=-1\n\
             (CMP_END_{n})"
        );
    }

    // --- memory access ------------------------------------------------------

    fn write_push(&mut self, segment: Segment, index: u16) {
        match segment_access(segment) {
            SegmentAccess::Constant => {
                let _ = writeln!(self.out, "@{index}\nD=A");
            }
            SegmentAccess::Indirect(base) => {
                let _ = writeln!(self.out, "@{index}\nD=A\n@{base}\nA=D+M\nD=M");
            }
            SegmentAccess::Direct if segment == Segment::Temp => {
                let _ = writeln!(self.out, "@{}\nD=M", temp_address(index));
            }
            SegmentAccess::Direct => {
                let _ = writeln!(self.out, "@{}\nD=M", pointer_symbol(index));
            }
            SegmentAccess::Static => {
                let _ = writeln!(self.out, "@{}.{index}\nD=M", self.file_scope);
            }
        }
        let _ = writeln!(self.out, "@SP\nA=M\nM=D\n@SP\nM=M+1");
    }

    fn write_pop(&mut self, segment: Segment, index: u16) {
        match segment_access(segment) {
            // Rejected by the parser; no command reaches here.
            SegmentAccess::Constant => debug_assert!(false, "pop to constant"),
            SegmentAccess::Indirect(base) => {
                // Target address goes through the R13 scratch register.
                let _ = writeln!(
                    self.out,
                    "@{index}\nD=A\n@{base}\nD=D+M\n@R13\nM=D\n\
                     @SP\nAM=M-1\nD=M\n@R13\nA=M\nM=D"
                );
            }
            SegmentAccess::Direct if segment == Segment::Temp => {
                let _ = writeln!(
                    self.out,
                    "@SP\nAM=M-1\nD=M\n@{}\nM=D",
                    temp_address(index)
                );
            }
            SegmentAccess::Direct => {
                let _ = writeln!(
                    self.out,
                    "@SP\nAM=M-1\nD=M\n@{}\nM=D",
                    pointer_symbol(index)
                );
            }
            SegmentAccess::Static => {
                let _ = writeln!(
                    self.out,
                    "@SP\nAM=M-1\nD=M\n@{}.{index}\nM=D",
                    self.file_scope
                );
            }
        }
    }

    // --- program flow -------------------------------------------------------

    fn scoped_label(&self, label: &str) -> String {
        if !self.current_function.is_empty() {
            format!("{}${label}", self.current_function)
        } else if !self.file_scope.is_empty() {
            format!("{}${label}", self.file_scope)
        } else {
            label.to_string()
        }
    }

    // --- functions ----------------------------------------------------------

    fn write_function(&mut self, name: &str, num_locals: u16) {
        self.current_function = name.to_string();
        let _ = writeln!(self.out, "({name})");
        for _ in 0..num_locals {
            let _ = writeln!(self.out, "@SP\nA=M\nM=0\n@SP\nM=M+1");
        }
    }

    fn write_call(&mut self, name: &str, num_args: u16) {
        let n = self.return_counter;
        self.return_counter += 1;
        let prefix = if self.current_function.is_empty() {
            &self.file_scope
        } else {
            &self.current_function
        };
        let return_label = format!("{prefix}$ret.{n}");
        self.emit_call(name, num_args, &return_label);
    }

    fn emit_call(&mut self, name: &str, num_args: u16, return_label: &str) {
        // Push the return address, then the caller's four segment pointers.
        let _ = writeln!(
            self.out,
            "@{return_label}\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1"
        );
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            let _ = writeln!(self.out, "@{saved}\nD=M\n@SP\nA=M\nM=D\n@SP\nM=M+1");
        }
        // ARG = SP - num_args - 5; LCL = SP; jump; resumption point.
        let _ = writeln!(self.out, "@SP\nD=M\n@{}\nD=D-A\n@ARG\nM=D", num_args + 5);
        let _ = writeln!(self.out, "@SP\nD=M\n@LCL\nM=D");
        let _ = writeln!(self.out, "@{name}\n0;JMP");
        let _ = writeln!(self.out, "({return_label})");
    }

    fn write_return(&mut self) {
        // frame = LCL -> R13; retAddr = *(frame-5) -> R14.
        let _ = writeln!(self.out, "@LCL\nD=M\n@R13\nM=D");
        let _ = writeln!(self.out, "@5\nA=D-A\nD=M\n@R14\nM=D");
        // *ARG = pop(). Must precede the SP move: the return slot sits below
        // the current stack top.
        let _ = writeln!(self.out, "@SP\nAM=M-1\nD=M\n@ARG\nA=M\nM=D");
        // SP = ARG + 1.
        let _ = writeln!(self.out, "@ARG\nD=M+1\n@SP\nM=D");
        // Restore THAT, THIS, ARG, LCL from frame-1..frame-4.
        for saved in ["THAT", "THIS", "ARG", "LCL"] {
            let _ = writeln!(self.out, "@R13\nAM=M-1\nD=M\n@{saved}\nM=D");
        }
        let _ = writeln!(self.out, "@R14\nA=M\n0;JMP");
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_one(writer: &mut CodeWriter, cmd: VmCommand) -> String {
        writer.write_command(&cmd);
        writer.assembly().to_string()
    }

    #[test]
    fn test_add() {
        let mut w = CodeWriter::new();
        let asm = write_one(&mut w, VmCommand::Arithmetic(ArithmeticOp::Add));
        assert!(asm.contains("AM=M-1"));
        assert!(asm.contains("M=D+M"));
    }

    #[test]
    fn test_sub_operand_order() {
        let mut w = CodeWriter::new();
        let asm = write_one(&mut w, VmCommand::Arithmetic(ArithmeticOp::Sub));
        assert!(asm.contains("M=M-D")); // x - y, not y - x
    }

    #[test]
    fn test_push_constant() {
        let mut w = CodeWriter::new();
        let asm = write_one(
            &mut w,
            VmCommand::Push {
                segment: Segment::Constant,
                index: 7,
            },
        );
        assert_eq!(asm, "@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }

    #[test]
    fn test_push_local_indirect() {
        let mut w = CodeWriter::new();
        let asm = write_one(
            &mut w,
            VmCommand::Push {
                segment: Segment::Local,
                index: 2,
            },
        );
        assert!(asm.starts_with("@2\nD=A\n@LCL\nA=D+M\nD=M\n"));
    }

    #[test]
    fn test_pop_indirect_uses_r13() {
        let mut w = CodeWriter::new();
        let asm = write_one(
            &mut w,
            VmCommand::Pop {
                segment: Segment::That,
                index: 3,
            },
        );
        assert!(asm.contains("@THAT\nD=D+M\n@R13\nM=D"));
        assert!(asm.contains("@R13\nA=M\nM=D"));
    }

    #[test]
    fn test_temp_and_pointer_addresses() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Push {
            segment: Segment::Temp,
            index: 3,
        });
        w.write_command(&VmCommand::Pop {
            segment: Segment::Pointer,
            index: 1,
        });
        let asm = w.assembly();
        assert!(asm.contains("@8\nD=M")); // temp 3 -> RAM[8]
        assert!(asm.contains("@THAT\nM=D")); // pointer 1 -> THAT
    }

    #[test]
    fn test_static_uses_file_scope() {
        let mut w = CodeWriter::new();
        w.set_file("Widget");
        w.write_command(&VmCommand::Push {
            segment: Segment::Static,
            index: 4,
        });
        assert!(w.assembly().contains("@Widget.4\nD=M"));
    }

    #[test]
    fn test_comparison_labels_are_unique() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Arithmetic(ArithmeticOp::Eq));
        w.write_command(&VmCommand::Arithmetic(ArithmeticOp::Lt));
        w.write_command(&VmCommand::Arithmetic(ArithmeticOp::Eq));
        let asm = w.assembly();
        for n in 0..3 {
            assert!(asm.contains(&format!("(CMP_TRUE_{n})")));
            assert!(asm.contains(&format!("(CMP_END_{n})")));
        }
    }

    #[test]
    fn test_labels_scope_to_function() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Function {
            name: "Foo.bar".to_string(),
            num_locals: 0,
        });
        w.write_command(&VmCommand::Label {
            name: "LOOP".to_string(),
        });
        w.write_command(&VmCommand::Goto {
            label: "LOOP".to_string(),
        });
        w.write_command(&VmCommand::IfGoto {
            label: "LOOP".to_string(),
        });
        let asm = w.assembly();
        assert!(asm.contains("(Foo.bar$LOOP)"));
        assert!(asm.contains("@Foo.bar$LOOP\n0;JMP"));
        assert!(asm.contains("@Foo.bar$LOOP\nD;JNE"));
    }

    #[test]
    fn test_function_zero_initializes_locals() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Function {
            name: "Foo.bar".to_string(),
            num_locals: 2,
        });
        let asm = w.assembly();
        assert!(asm.starts_with("(Foo.bar)\n"));
        assert_eq!(asm.matches("M=0").count(), 2);
    }

    #[test]
    fn test_call_frame_choreography() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Function {
            name: "Main.main".to_string(),
            num_locals: 0,
        });
        w.write_command(&VmCommand::Call {
            name: "Foo.bar".to_string(),
            num_args: 2,
        });
        let asm = w.assembly();
        assert!(asm.contains("@Main.main$ret.0\nD=A"));
        assert!(asm.contains("@7\nD=D-A\n@ARG\nM=D")); // SP - (2 + 5)
        assert!(asm.contains("@SP\nD=M\n@LCL\nM=D"));
        assert!(asm.contains("@Foo.bar\n0;JMP"));
        assert!(asm.contains("(Main.main$ret.0)"));
    }

    #[test]
    fn test_return_sequence() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Return);
        let asm = w.assembly();
        assert!(asm.contains("@LCL\nD=M\n@R13\nM=D"));
        assert!(asm.contains("@5\nA=D-A\nD=M\n@R14\nM=D"));
        // Return value lands before SP moves.
        let copy = asm.find("@ARG\nA=M\nM=D").unwrap();
        let sp_move = asm.find("@ARG\nD=M+1\n@SP\nM=D").unwrap();
        assert!(copy < sp_move);
        assert!(asm.contains("@R14\nA=M\n0;JMP"));
    }

    #[test]
    fn test_return_counter_spans_functions() {
        let mut w = CodeWriter::new();
        w.write_command(&VmCommand::Function {
            name: "A.f".to_string(),
            num_locals: 0,
        });
        w.write_command(&VmCommand::Call {
            name: "B.g".to_string(),
            num_args: 0,
        });
        w.write_command(&VmCommand::Function {
            name: "B.g".to_string(),
            num_locals: 0,
        });
        w.write_command(&VmCommand::Call {
            name: "A.f".to_string(),
            num_args: 0,
        });
        let asm = w.assembly();
        assert!(asm.contains("(A.f$ret.0)"));
        assert!(asm.contains("(B.g$ret.1)"));
    }

    #[test]
    fn test_bootstrap() {
        let mut w = CodeWriter::new();
        w.write_bootstrap();
        let asm = w.assembly();
        assert!(asm.starts_with("@256\nD=A\n@SP\nM=D\n"));
        assert!(asm.contains("@Sys.init\n0;JMP"));
        assert!(asm.contains("(Sys.init$ret.BOOTSTRAP)"));
        assert!(asm.contains("(HALT)\n@HALT\n0;JMP"));
    }
}

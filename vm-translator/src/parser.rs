//! Line-oriented parser for the stack-machine command set.

use crate::error::{Result, VmError};

/// Arithmetic and logical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Lt,
    Gt,
    And,
    Or,
    Not,
}

/// Memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

/// One stack-machine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label { name: String },
    Goto { label: String },
    IfGoto { label: String },
    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

/// Parses a single line. `Ok(None)` for blanks and comments.
pub fn parse_line(line: &str, line_num: usize, filename: &str) -> Result<Option<VmCommand>> {
    let line = line.split("//").next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();

    let command = match parts[0] {
        "add" => VmCommand::Arithmetic(ArithmeticOp::Add),
        "sub" => VmCommand::Arithmetic(ArithmeticOp::Sub),
        "neg" => VmCommand::Arithmetic(ArithmeticOp::Neg),
        "eq" => VmCommand::Arithmetic(ArithmeticOp::Eq),
        "lt" => VmCommand::Arithmetic(ArithmeticOp::Lt),
        "gt" => VmCommand::Arithmetic(ArithmeticOp::Gt),
        "and" => VmCommand::Arithmetic(ArithmeticOp::And),
        "or" => VmCommand::Arithmetic(ArithmeticOp::Or),
        "not" => VmCommand::Arithmetic(ArithmeticOp::Not),
        "return" => VmCommand::Return,
        "push" | "pop" => parse_memory_access(&parts, line_num, filename)?,
        "label" | "goto" | "if-goto" => parse_flow(&parts, line_num, filename)?,
        "function" | "call" => parse_function_command(&parts, line_num, filename)?,
        other => {
            return Err(VmError::InvalidCommand {
                line: line_num,
                file: filename.to_string(),
                command: other.to_string(),
            });
        }
    };

    Ok(Some(command))
}

fn parse_memory_access(parts: &[&str], line_num: usize, filename: &str) -> Result<VmCommand> {
    if parts.len() < 3 {
        return Err(VmError::MissingArgument {
            line: line_num,
            file: filename.to_string(),
            command: parts[0].to_string(),
        });
    }

    let segment = parse_segment(parts[1], line_num, filename)?;
    let index = parse_index(parts[2], line_num, filename)?;

    match segment {
        Segment::Constant if parts[0] == "pop" => Err(VmError::PopToConstant {
            line: line_num,
            file: filename.to_string(),
        }),
        Segment::Pointer if index > 1 => Err(VmError::InvalidPointerIndex {
            line: line_num,
            file: filename.to_string(),
            index,
        }),
        Segment::Temp if index > 7 => Err(VmError::InvalidTempIndex {
            line: line_num,
            file: filename.to_string(),
            index,
        }),
        _ if parts[0] == "push" => Ok(VmCommand::Push { segment, index }),
        _ => Ok(VmCommand::Pop { segment, index }),
    }
}

fn parse_flow(parts: &[&str], line_num: usize, filename: &str) -> Result<VmCommand> {
    if parts.len() < 2 {
        return Err(VmError::MissingArgument {
            line: line_num,
            file: filename.to_string(),
            command: parts[0].to_string(),
        });
    }

    let label = parts[1].to_string();
    Ok(match parts[0] {
        "label" => VmCommand::Label { name: label },
        "goto" => VmCommand::Goto { label },
        _ => VmCommand::IfGoto { label },
    })
}

fn parse_function_command(parts: &[&str], line_num: usize, filename: &str) -> Result<VmCommand> {
    if parts.len() < 3 {
        return Err(VmError::MissingArgument {
            line: line_num,
            file: filename.to_string(),
            command: parts[0].to_string(),
        });
    }

    let name = parts[1].to_string();
    let count = parse_index(parts[2], line_num, filename)?;

    Ok(if parts[0] == "function" {
        VmCommand::Function {
            name,
            num_locals: count,
        }
    } else {
        VmCommand::Call {
            name,
            num_args: count,
        }
    })
}

fn parse_segment(s: &str, line_num: usize, filename: &str) -> Result<Segment> {
    match s {
        "constant" => Ok(Segment::Constant),
        "local" => Ok(Segment::Local),
        "argument" => Ok(Segment::Argument),
        "this" => Ok(Segment::This),
        "that" => Ok(Segment::That),
        "pointer" => Ok(Segment::Pointer),
        "temp" => Ok(Segment::Temp),
        "static" => Ok(Segment::Static),
        _ => Err(VmError::InvalidSegment {
            line: line_num,
            file: filename.to_string(),
            segment: s.to_string(),
        }),
    }
}

fn parse_index(s: &str, line_num: usize, filename: &str) -> Result<u16> {
    s.parse::<u16>().map_err(|_| VmError::InvalidNumber {
        line: line_num,
        file: filename.to_string(),
        value: s.to_string(),
    })
}

use crate::error::{AsmError, Result};

/// One classified source line. C-instruction fields stay textual; they are
/// resolved against the mnemonic tables during pass 2 so an unknown mnemonic
/// can be reported by field name.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Empty,
    Label(String),
    AValue(u16),
    ASymbol(String),
    C {
        dest: String,
        comp: String,
        jump: String,
    },
}

impl Line {
    /// A and C instructions occupy a ROM address; labels and blanks do not.
    pub fn occupies_rom(&self) -> bool {
        matches!(self, Line::AValue(_) | Line::ASymbol(_) | Line::C { .. })
    }
}

/// Strip comments and surrounding whitespace.
fn clean_line(line: &str) -> &str {
    line.split("//").next().unwrap_or("").trim()
}

fn parse_a_instruction(line: &str, line_num: usize) -> Result<Line> {
    let operand = &line[1..];

    if operand.is_empty() {
        return Err(AsmError::InvalidSyntax {
            line: line_num,
            text: line.to_string(),
        });
    }

    if operand.bytes().all(|b| b.is_ascii_digit()) {
        let value = operand
            .parse::<u32>()
            .ok()
            .filter(|&v| v <= 32767)
            .ok_or_else(|| AsmError::InvalidAValue {
                line: line_num,
                value: operand.to_string(),
            })?;
        return Ok(Line::AValue(value as u16));
    }

    Ok(Line::ASymbol(operand.to_string()))
}

fn parse_c_instruction(line: &str) -> Line {
    let (dest, rest) = match line.find('=') {
        Some(eq) => (&line[..eq], &line[eq + 1..]),
        None => ("", line),
    };
    let (comp, jump) = match rest.find(';') {
        Some(semi) => (&rest[..semi], &rest[semi + 1..]),
        None => (rest, ""),
    };
    Line::C {
        dest: dest.trim().to_string(),
        comp: comp.trim().to_string(),
        jump: jump.trim().to_string(),
    }
}

/// Classify a single source line.
pub fn parse_line(line: &str, line_num: usize) -> Result<Line> {
    let clean = clean_line(line);

    if clean.is_empty() {
        return Ok(Line::Empty);
    }

    if clean.starts_with('(') {
        if !clean.ends_with(')') || clean.len() < 3 {
            return Err(AsmError::InvalidSyntax {
                line: line_num,
                text: line.to_string(),
            });
        }
        return Ok(Line::Label(clean[1..clean.len() - 1].to_string()));
    }

    if clean.starts_with('@') {
        return parse_a_instruction(clean, line_num);
    }

    Ok(parse_c_instruction(clean))
}

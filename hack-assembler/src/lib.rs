//! Two-pass assembler for the Hack architecture.
//!
//! Pass 1 collects label declarations at their ROM addresses; pass 2 resolves
//! symbols (allocating variables from address 16 in first-use order), looks
//! each C-instruction field up in the fixed mnemonic tables, and emits one
//! 16-character binary word per instruction. An optional third pass renders
//! a human-readable listing without mutating the symbol table.

pub mod code_table;
pub mod error;
pub mod listing;
pub mod parser;
pub mod symbols;

use code_table::{c_word, comp_bits, dest_bits, jump_bits, push_word};
use error::{AsmError, Result};
use listing::generate_listing;
use parser::{Line, parse_line};
use symbols::SymbolTable;

struct Passes {
    binary: String,
    lines: Vec<(String, Line)>,
    symbol_table: SymbolTable,
}

fn run_passes(source: &str) -> Result<Passes> {
    // Pass 1: classify every line and collect label addresses.
    let mut symbol_table = SymbolTable::new();
    let mut lines = Vec::new();
    let mut rom_address = 0u16;

    for (index, raw) in source.lines().enumerate() {
        let line_num = index + 1;
        let parsed = parse_line(raw, line_num)?;

        match &parsed {
            Line::Label(label) => {
                symbol_table
                    .add_label(label.clone(), rom_address)
                    .map_err(|label| AsmError::DuplicateLabel {
                        line: line_num,
                        label,
                    })?;
            }
            line if line.occupies_rom() => rom_address += 1,
            _ => {}
        }

        lines.push((raw.to_string(), parsed));
    }

    // Pass 2: resolve symbols and emit binary words.
    let mut binary = String::with_capacity(lines.len() * 17);

    for (index, (_, line)) in lines.iter().enumerate() {
        let line_num = index + 1;
        let word = match line {
            Line::AValue(value) => *value,
            Line::ASymbol(symbol) => symbol_table.get_or_allocate(symbol),
            Line::C { dest, comp, jump } => c_word(
                dest_bits(dest, line_num)?,
                comp_bits(comp, line_num)?,
                jump_bits(jump, line_num)?,
            ),
            Line::Label(_) | Line::Empty => continue,
        };
        push_word(word, &mut binary);
        binary.push('\n');
    }

    Ok(Passes {
        binary: binary.trim_end().to_string(),
        lines,
        symbol_table,
    })
}

/// Assembles Hack assembly source to its binary text form.
pub fn assemble(source: &str) -> Result<String> {
    Ok(run_passes(source)?.binary)
}

/// Assembles and additionally renders the diagnostic listing table.
pub fn assemble_with_listing(source: &str) -> Result<(String, String)> {
    let passes = run_passes(source)?;
    let listing = generate_listing(&passes.lines, &passes.symbol_table);
    Ok((passes.binary, listing))
}

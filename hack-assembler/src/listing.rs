//! Human-readable listing generation: a third, read-only pass over the
//! classified source that tabulates each line's ROM address and resolved
//! data address next to the original text. It only reads addresses that
//! pass 2 already resolved; it never touches the symbol table's allocator.

use std::fmt::Write;

use crate::parser::Line;
use crate::symbols::SymbolTable;

const COLUMN_WIDTH: usize = 10;

/// Center `s` in a fixed-width column; the odd spare space goes on the right.
fn center(s: &str) -> String {
    let len = s.chars().count();
    if len >= COLUMN_WIDTH {
        return s.to_string();
    }
    let spare = COLUMN_WIDTH - len;
    let left = spare / 2;
    let right = spare - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// Renders the listing table for an already-assembled program.
pub fn generate_listing(lines: &[(String, Line)], table: &SymbolTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}|{}| Source", center("ROM"), center("Address"));

    let mut rom_address = 0u16;
    for (raw, line) in lines {
        match line {
            Line::Empty => {
                let _ = writeln!(
                    out,
                    "{}|{}| {raw}",
                    " ".repeat(COLUMN_WIDTH),
                    " ".repeat(COLUMN_WIDTH)
                );
            }
            Line::Label(label) => {
                // Pass 1 recorded every label, so this lookup cannot miss.
                let address = table.get(label).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{}|{}| {raw}",
                    center(&address.to_string()),
                    center(&format!("ROM[{address}]"))
                );
            }
            Line::AValue(value) => {
                let _ = writeln!(
                    out,
                    "{}|{}| {raw}",
                    center(&rom_address.to_string()),
                    center(&value.to_string())
                );
                rom_address += 1;
            }
            Line::ASymbol(symbol) => {
                let address = table.get(symbol).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{}|{}| {raw}",
                    center(&rom_address.to_string()),
                    center(&format!("RAM[{address}]"))
                );
                rom_address += 1;
            }
            Line::C { .. } => {
                let _ = writeln!(out, "{}|{}| {raw}", center(&rom_address.to_string()), center(""));
                rom_address += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_even_and_odd() {
        assert_eq!(center("ROM"), "   ROM    ");
        assert_eq!(center("Address"), " Address  ");
        assert_eq!(center(""), "          ");
        assert_eq!(center("0123456789AB"), "0123456789AB");
    }

    #[test]
    fn test_listing_rows() {
        let mut table = SymbolTable::new();
        table.add_label("LOOP".to_string(), 1).unwrap();
        table.get_or_allocate("i");

        let lines = vec![
            ("// setup".to_string(), Line::Empty),
            ("@i".to_string(), Line::ASymbol("i".to_string())),
            ("(LOOP)".to_string(), Line::Label("LOOP".to_string())),
            ("@5".to_string(), Line::AValue(5)),
            (
                "D=A".to_string(),
                Line::C {
                    dest: "D".to_string(),
                    comp: "A".to_string(),
                    jump: String::new(),
                },
            ),
        ];

        let listing = generate_listing(&lines, &table);
        let rows: Vec<&str> = listing.lines().collect();
        assert_eq!(rows[0], "   ROM    | Address  | Source");
        assert_eq!(rows[1], "          |          | // setup");
        assert_eq!(rows[2], "    0     | RAM[16]  | @i");
        assert_eq!(rows[3], "    1     |  ROM[1]  | (LOOP)");
        assert_eq!(rows[4], "    1     |    5     | @5");
        assert_eq!(rows[5], "    2     |          | D=A");
    }
}

//! Fixed mnemonic tables for the three C-instruction fields.
//!
//! Each lookup resolves one textual field to its bit pattern; a mnemonic
//! missing from its table is fatal and names the field it appeared in.

use phf::phf_map;

use crate::error::{AsmError, Result};

static DEST: phf::Map<&'static str, u8> = phf_map! {
    "M" => 0b001,
    "D" => 0b010,
    "MD" => 0b011, "DM" => 0b011,
    "A" => 0b100,
    "AM" => 0b101, "MA" => 0b101,
    "AD" => 0b110, "DA" => 0b110,
    "AMD" => 0b111, "ADM" => 0b111, "MAD" => 0b111,
    "MDA" => 0b111, "DAM" => 0b111, "DMA" => 0b111,
};

// 7 bits: the a-flag (A vs M operand) followed by the 6-bit ALU code.
static COMP: phf::Map<&'static str, u8> = phf_map! {
    "0" => 0b0101010,
    "1" => 0b0111111,
    "-1" => 0b0111010,

    "D" => 0b0001100,
    "!D" => 0b0001101,
    "-D" => 0b0001111,
    "D+1" => 0b0011111, "1+D" => 0b0011111,
    "D-1" => 0b0001110,

    "A" => 0b0110000,
    "!A" => 0b0110001,
    "-A" => 0b0110011,
    "A+1" => 0b0110111, "1+A" => 0b0110111,
    "A-1" => 0b0110010,

    "D+A" => 0b0000010, "A+D" => 0b0000010,
    "D-A" => 0b0010011,
    "A-D" => 0b0000111,
    "D&A" => 0b0000000, "A&D" => 0b0000000,
    "D|A" => 0b0010101, "A|D" => 0b0010101,

    "M" => 0b1110000,
    "!M" => 0b1110001,
    "-M" => 0b1110011,
    "M+1" => 0b1110111, "1+M" => 0b1110111,
    "M-1" => 0b1110010,

    "D+M" => 0b1000010, "M+D" => 0b1000010,
    "D-M" => 0b1010011,
    "M-D" => 0b1000111,
    "D&M" => 0b1000000, "M&D" => 0b1000000,
    "D|M" => 0b1010101, "M|D" => 0b1010101,
};

static JUMP: phf::Map<&'static str, u8> = phf_map! {
    "JGT" => 0b001,
    "JEQ" => 0b010,
    "JGE" => 0b011,
    "JLT" => 0b100,
    "JNE" => 0b101,
    "JLE" => 0b110,
    "JMP" => 0b111,
};

pub fn dest_bits(mnemonic: &str, line: usize) -> Result<u8> {
    if mnemonic.is_empty() {
        return Ok(0);
    }
    DEST.get(mnemonic)
        .copied()
        .ok_or_else(|| AsmError::UnknownDest {
            line,
            mnemonic: mnemonic.to_string(),
        })
}

pub fn comp_bits(mnemonic: &str, line: usize) -> Result<u8> {
    COMP.get(mnemonic)
        .copied()
        .ok_or_else(|| AsmError::UnknownComp {
            line,
            mnemonic: mnemonic.to_string(),
        })
}

pub fn jump_bits(mnemonic: &str, line: usize) -> Result<u8> {
    if mnemonic.is_empty() {
        return Ok(0);
    }
    JUMP.get(mnemonic)
        .copied()
        .ok_or_else(|| AsmError::UnknownJump {
            line,
            mnemonic: mnemonic.to_string(),
        })
}

/// Assemble the 16-bit C-instruction word from the three resolved fields.
#[inline]
pub fn c_word(dest: u8, comp: u8, jump: u8) -> u16 {
    0b1110_0000_0000_0000 | (u16::from(comp) << 6) | (u16::from(dest) << 3) | u16::from(jump)
}

/// Append the 16-character binary form of a word, most significant bit first.
pub fn push_word(word: u16, buf: &mut String) {
    for i in (0..16).rev() {
        buf.push(if word & (1 << i) != 0 { '1' } else { '0' });
    }
}

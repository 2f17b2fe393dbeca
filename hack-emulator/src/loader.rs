//! Program loading for the two on-disk machine-code formats: `.hack`
//! (one 16-character binary string per line) and `.bin` (raw 16-bit words).

use std::fs;
use std::path::Path;

use crate::error::{EmulatorError, Result};

/// Loads a program, picking the format from the file extension.
pub fn load_program(path: &Path) -> Result<Vec<i16>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("hack") => parse_hack(&fs::read_to_string(path)?),
        Some("bin") => parse_bin(&fs::read(path)?),
        _ => Err(EmulatorError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

/// Parses the textual format: each non-empty line is 16 binary digits,
/// most significant bit first. Whitespace within a line is ignored.
pub fn parse_hack(text: &str) -> Result<Vec<i16>> {
    let mut words = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
        if line.is_empty() {
            continue;
        }
        if line.len() != 16 || !line.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(EmulatorError::MalformedWord {
                line: index + 1,
                text: raw.trim().to_string(),
            });
        }
        let mut word: u16 = 0;
        for bit in line.bytes() {
            word = word << 1 | u16::from(bit - b'0');
        }
        words.push(word as i16);
    }
    Ok(words)
}

/// Parses the raw format: a flat sequence of native-endian 16-bit words.
pub fn parse_bin(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.len() % 2 != 0 {
        return Err(EmulatorError::TruncatedProgram { bytes: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_ne_bytes([pair[0], pair[1]]))
        .collect())
}

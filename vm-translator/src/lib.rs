//! Stack-machine to Hack assembly translator.
//!
//! Translates `.vm` files (arithmetic, memory access, branching, and the
//! full function calling convention) into a single `.asm` program.
//!
//! Single-file mode emits no bootstrap; directory mode emits the bootstrap
//! (SP = 256, `call Sys.init 0`) when a `Sys.vm` is present, translating it
//! first and the remaining files alphabetically.

pub mod codegen;
pub mod error;
pub mod memory;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::CodeWriter;
pub use crate::error::{Result, VmError};
use crate::parser::parse_line;

fn translate_into(writer: &mut CodeWriter, source: &str, filename: &str) -> Result<()> {
    writer.set_file(filename);
    for (index, line) in source.lines().enumerate() {
        if let Some(cmd) = parse_line(line, index + 1, filename)? {
            writer.write_command(&cmd);
        }
    }
    Ok(())
}

/// Translates one source string. No bootstrap is emitted.
pub fn translate(source: &str, filename: &str) -> Result<String> {
    let mut writer = CodeWriter::new();
    translate_into(&mut writer, source, filename)?;
    Ok(writer.into_assembly())
}

/// Translates a single `.vm` file. No bootstrap is emitted.
pub fn translate_file(path: &Path) -> Result<String> {
    let mut writer = CodeWriter::new();
    translate_file_into(&mut writer, path)?;
    Ok(writer.into_assembly())
}

fn translate_file_into(writer: &mut CodeWriter, path: &Path) -> Result<()> {
    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown");
    let source = fs::read_to_string(path).map_err(|e| VmError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    translate_into(writer, &source, filename)
}

/// Translates every `.vm` file in a directory into one assembly program.
///
/// `Sys.vm`, when present, triggers the bootstrap and is translated first;
/// the rest follow in alphabetical order. One shared writer keeps the
/// generated labels unique across files.
pub fn translate_directory(dir_path: &Path) -> Result<String> {
    let mut vm_files: Vec<PathBuf> = fs::read_dir(dir_path)
        .map_err(|e| VmError::FileRead {
            path: dir_path.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();

    if vm_files.is_empty() {
        return Err(VmError::NoVmFiles {
            path: dir_path.display().to_string(),
        });
    }

    vm_files.sort();

    let sys_file = dir_path.join("Sys.vm");
    let has_sys = sys_file.exists();

    let mut writer = CodeWriter::new();

    if has_sys {
        writer.write_bootstrap();
        translate_file_into(&mut writer, &sys_file)?;
        vm_files.retain(|f| f.file_name() != Some(std::ffi::OsStr::new("Sys.vm")));
    }

    for vm_file in vm_files {
        translate_file_into(&mut writer, &vm_file)?;
    }

    Ok(writer.into_assembly())
}

/// Output path rules: `Input.vm` -> `Input.asm`; `dir/` -> `dir/dir.asm`.
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{dir_name}.asm"))
    } else {
        input.with_extension("asm")
    }
}

//! Jack to VM code compiler.
//!
//! The pipeline: tokenize -> validate -> parse -> analyze -> generate.
//! Parsing is per file (one class per file); semantic analysis is
//! whole-program, so cross-class calls resolve regardless of declaration
//! order. The first error at any layer aborts the run; code generation
//! never sees an unvalidated AST.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod semantics;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod validator;
pub mod vm_writer;

use std::fs;
use std::path::{Path, PathBuf};

pub use crate::error::{CompileError, Diagnostic, Result};
use crate::parser::Parser;

/// One source file queued for compilation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

/// The VM code generated for one class.
#[derive(Debug, Clone)]
pub struct CompiledClass {
    pub name: String,
    pub vm_code: String,
}

/// Compile a set of source files as one program.
pub fn compile_sources(sources: &[SourceFile]) -> Result<Vec<CompiledClass>> {
    let mut classes = Vec::with_capacity(sources.len());
    for file in sources {
        let class = Parser::new(&file.text)
            .parse()
            .map_err(|e| CompileError::in_file(&file.name, e))?;
        classes.push(class);
    }

    let table = semantics::analyze(&classes)?;

    Ok(classes
        .iter()
        .map(|class| CompiledClass {
            name: class.name.clone(),
            vm_code: codegen::generate(class, &table),
        })
        .collect())
}

/// Compile a single source string as a one-class program.
pub fn compile_source(source: &str, name: &str) -> Result<CompiledClass> {
    let mut results = compile_sources(&[SourceFile {
        name: name.to_string(),
        text: source.to_string(),
    }])?;
    Ok(results.remove(0))
}

/// Resolve a `.jack` file or a directory of them into an ordered input
/// list: `Main.jack` first, the rest alphabetically.
pub fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .map_err(|e| CompileError::io(path, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
        .collect();

    if files.is_empty() {
        return Err(CompileError::NoJackFiles {
            path: path.display().to_string(),
        });
    }

    files.sort();
    if let Some(main_at) = files
        .iter()
        .position(|p| p.file_name().is_some_and(|n| n == "Main.jack"))
    {
        let main = files.remove(main_at);
        files.insert(0, main);
    }
    Ok(files)
}

/// Read the resolved input files into memory.
pub fn read_sources(inputs: &[PathBuf]) -> Result<Vec<SourceFile>> {
    inputs
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            Ok(SourceFile { name, text })
        })
        .collect()
}

/// Compile a `.jack` file or directory into VM code, one result per class.
pub fn compile_path(path: &Path) -> Result<Vec<CompiledClass>> {
    let inputs = collect_inputs(path)?;
    let sources = read_sources(&inputs)?;
    compile_sources(&sources)
}

/// Write each class's VM code as `Class.vm` under the output directory.
pub fn write_outputs(results: &[CompiledClass], output_dir: &Path) -> Result<()> {
    for result in results {
        let out_path = output_dir.join(format!("{}.vm", result.name));
        fs::write(&out_path, &result.vm_code).map_err(|e| CompileError::io(&out_path, e))?;
    }
    Ok(())
}

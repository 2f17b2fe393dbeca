//! End-to-end driver for the Hack toolchain.
//!
//! Chains the four stages — Jack compiler, VM translator, assembler,
//! emulator — behind one library surface and the `hackc` binary. Each stage
//! only runs if the previous one succeeded; `build` lays the intermediate
//! outputs out in per-stage subdirectories under one output root.

pub mod error;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use crate::error::{PipelineError, Result};

/// Outputs of `assemble`: the binary text, and the listing when requested.
#[derive(Debug)]
pub struct Assembled {
    pub binary: String,
    pub listing: Option<String>,
}

/// Where `build` put each stage's output.
#[derive(Debug)]
pub struct BuildArtifacts {
    pub name: String,
    pub vm_files: Vec<PathBuf>,
    pub asm_file: PathBuf,
    pub hack_file: PathBuf,
}

/// Machine state captured after `run` stops.
#[derive(Debug)]
pub struct RunSummary {
    pub steps: u64,
    pub pc: u16,
    pub a: i16,
    pub d: i16,
    pub sp: i16,
    pub stack_top: Option<i16>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "halted after {} steps", self.steps)?;
        writeln!(f, "PC = {}, A = {}, D = {}", self.pc, self.a, self.d)?;
        match self.stack_top {
            Some(top) => write!(f, "SP = {}, top of stack = {}", self.sp, top),
            None => write!(f, "SP = {}", self.sp),
        }
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| PipelineError::io(path, e))
}

/// The program name a build is filed under: the directory name, or the
/// file stem for single-file input.
pub fn program_name(input: &Path) -> String {
    let part = if input.is_dir() {
        input.file_name()
    } else {
        input.file_stem()
    };
    part.and_then(|s| s.to_str()).unwrap_or("program").to_string()
}

/// Compiles a `.jack` file or directory, writing one `.vm` per class into
/// `out_dir`. Returns the written paths.
pub fn compile(input: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let results = jack_compiler::compile_path(input)?;
    jack_compiler::write_outputs(&results, out_dir)?;
    Ok(results
        .iter()
        .map(|r| out_dir.join(format!("{}.vm", r.name)))
        .collect())
}

/// Translates a `.vm` file or a directory of them to one assembly program.
pub fn translate(input: &Path) -> Result<String> {
    let asm = if input.is_dir() {
        vm_translator::translate_directory(input)?
    } else {
        vm_translator::translate_file(input)?
    };
    Ok(asm)
}

/// Assembles an `.asm` file, optionally with the diagnostic listing.
pub fn assemble(input: &Path, listing: bool) -> Result<Assembled> {
    let source = fs::read_to_string(input).map_err(|e| PipelineError::io(input, e))?;
    if listing {
        let (binary, listing) = hack_assembler::assemble_with_listing(&source)?;
        Ok(Assembled {
            binary,
            listing: Some(listing),
        })
    } else {
        Ok(Assembled {
            binary: hack_assembler::assemble(&source)?,
            listing: None,
        })
    }
}

/// Boots a `.hack` or `.bin` program and runs it to completion (or the
/// step limit), then reports the interesting machine state.
pub fn run(program: &Path, max_steps: u64) -> Result<RunSummary> {
    let mut cpu = hack_emulator::boot(program)?;
    run_cpu(&mut cpu, max_steps)
}

/// `run`, but on a caller-prepared machine (tests pre-seed RAM).
pub fn run_cpu(cpu: &mut hack_emulator::Cpu, max_steps: u64) -> Result<RunSummary> {
    let steps = cpu.run(max_steps)?;
    let sp = cpu.ram(0)?;
    // RAM[0] is only a stack pointer by convention; report the word below
    // it when the value is a plausible address.
    let stack_top = u16::try_from(sp)
        .ok()
        .filter(|&addr| addr > 0 && usize::from(addr) < hack_emulator::MEMORY_SIZE)
        .map(|addr| cpu.ram(addr - 1))
        .transpose()?;
    Ok(RunSummary {
        steps,
        pc: cpu.pc(),
        a: cpu.a_register(),
        d: cpu.d_register(),
        sp,
        stack_top,
    })
}

/// Runs the whole pipeline: `.jack` input to `vm/`, `asm/`, and `hack/`
/// under `out_root`. Any stage failure stops the pipeline there.
pub fn build(input: &Path, out_root: &Path) -> Result<BuildArtifacts> {
    let name = program_name(input);

    let vm_dir = out_root.join("vm");
    let asm_dir = out_root.join("asm");
    let hack_dir = out_root.join("hack");
    for dir in [&vm_dir, &asm_dir, &hack_dir] {
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    }

    let vm_files = compile(input, &vm_dir)?;

    let asm = translate(&vm_dir)?;
    let asm_file = asm_dir.join(format!("{name}.asm"));
    write_text(&asm_file, &asm)?;

    let binary = hack_assembler::assemble(&asm)?;
    let hack_file = hack_dir.join(format!("{name}.hack"));
    let mut contents = binary;
    contents.push('\n');
    write_text(&hack_file, &contents)?;

    Ok(BuildArtifacts {
        name,
        vm_files,
        asm_file,
        hack_file,
    })
}

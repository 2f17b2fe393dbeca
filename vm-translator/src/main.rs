use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vm_translator::{output_path, translate_directory, translate_file};

#[derive(Parser)]
#[command(
    name = "VMTranslator",
    version,
    about = "Translates stack-machine .vm files to Hack assembly"
)]
struct Args {
    /// A .vm file or a directory of .vm files
    input: PathBuf,

    /// Write the assembly here instead of the default location
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = if args.input.is_dir() {
        translate_directory(&args.input)
    } else {
        translate_file(&args.input)
    };

    let assembly = match result {
        Ok(asm) => asm,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let out_path = args.output.unwrap_or_else(|| output_path(&args.input));
    if let Err(e) = fs::write(&out_path, &assembly) {
        eprintln!("error: failed to write {}: {e}", out_path.display());
        return ExitCode::FAILURE;
    }

    if args.verbose {
        eprintln!("{} assembly lines generated", assembly.lines().count());
    }
    println!("{} -> {}", args.input.display(), out_path.display());
    ExitCode::SUCCESS
}

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use jack_compiler::{
    CompileError, Diagnostic, SourceFile, collect_inputs, compile_sources, read_sources,
    write_outputs,
};

#[derive(Parser)]
#[command(
    name = "JackCompiler",
    version,
    about = "Compiles Jack source files to VM code"
)]
struct Args {
    /// A .jack file or a directory of .jack files
    input: PathBuf,

    /// Write the .vm files here instead of next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

fn report(error: &CompileError, sources: &[SourceFile]) {
    // When the error names its file, render the offending line and caret.
    if let CompileError::InFile { file, source } = error
        && let Some(sf) = sources.iter().find(|s| &s.name == file)
    {
        eprintln!("{}", Diagnostic::new(file, &sf.text).render(source));
        return;
    }
    eprintln!("error: {error}");
}

fn main() -> ExitCode {
    let args = Args::parse();

    let inputs = match collect_inputs(&args.input) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sources = match read_sources(&inputs) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let results = match compile_sources(&sources) {
        Ok(results) => results,
        Err(e) => {
            report(&e, &sources);
            return ExitCode::FAILURE;
        }
    };

    let output_dir = args.output.unwrap_or_else(|| {
        if args.input.is_dir() {
            args.input.clone()
        } else {
            args.input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
    });

    if let Err(e) = write_outputs(&results, &output_dir) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    for result in &results {
        if args.verbose {
            eprintln!(
                "{}: {} VM commands",
                result.name,
                result.vm_code.lines().count()
            );
        }
        println!(
            "{}.jack -> {}",
            result.name,
            output_dir.join(format!("{}.vm", result.name)).display()
        );
    }
    ExitCode::SUCCESS
}

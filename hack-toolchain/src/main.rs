use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hack_toolchain::{PipelineError, Result, assemble, build, compile, run, translate};

#[derive(Parser)]
#[command(
    name = "hackc",
    version,
    about = "Drives the Hack toolchain: Jack -> VM -> assembly -> binary -> execution"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile .jack sources to .vm files
    Compile {
        /// A .jack file or a directory of .jack files
        input: PathBuf,

        /// Write the .vm files here instead of next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate .vm files to Hack assembly
    Translate {
        /// A .vm file or a directory of .vm files
        input: PathBuf,

        /// Write the assembly here instead of the default location
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble a .asm file to binary machine code
    Assemble {
        /// The .asm file
        input: PathBuf,

        /// Write the .hack file here instead of next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the symbol-resolution listing to stderr
        #[arg(long)]
        listing: bool,
    },

    /// Execute a .hack or .bin program and print the final machine state
    Run {
        /// The program file
        input: PathBuf,

        /// Stop after this many instructions
        #[arg(long, default_value_t = 10_000_000)]
        max_steps: u64,
    },

    /// Run the whole pipeline into vm/, asm/ and hack/ subdirectories
    Build {
        /// A .jack file or a directory of .jack files
        input: PathBuf,

        /// The output root directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,
    },
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| PipelineError::io(path, e))
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Compile { input, output } => {
            let out_dir = output.unwrap_or_else(|| {
                if input.is_dir() {
                    input.clone()
                } else {
                    input
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from("."))
                }
            });
            for path in compile(&input, &out_dir)? {
                println!("{}", path.display());
            }
        }

        Command::Translate { input, output } => {
            let asm = translate(&input)?;
            let out_path = output.unwrap_or_else(|| vm_translator::output_path(&input));
            write_text(&out_path, &asm)?;
            println!("{} -> {}", input.display(), out_path.display());
        }

        Command::Assemble {
            input,
            output,
            listing,
        } => {
            let assembled = assemble(&input, listing)?;
            let out_path = output.unwrap_or_else(|| input.with_extension("hack"));
            let mut contents = assembled.binary;
            contents.push('\n');
            write_text(&out_path, &contents)?;
            if let Some(listing) = assembled.listing {
                eprintln!("{listing}");
            }
            println!("{} -> {}", input.display(), out_path.display());
        }

        Command::Run { input, max_steps } => {
            let summary = run(&input, max_steps)?;
            println!("{summary}");
        }

        Command::Build { input, output } => {
            let artifacts = build(&input, &output)?;
            for path in &artifacts.vm_files {
                println!("{}", path.display());
            }
            println!("{}", artifacts.asm_file.display());
            println!("{}", artifacts.hack_file.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

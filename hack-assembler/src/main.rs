use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use hack_assembler::{assemble, assemble_with_listing};

#[derive(Parser)]
#[command(name = "HackAssembler", version, about = "Assembles Hack assembly to binary")]
struct Args {
    /// Input .asm files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Also write a <name>.listing.txt diagnostic table per input
    #[arg(short, long)]
    listing: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

fn assemble_file(input: &PathBuf, listing: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let source = fs::read_to_string(input)?;

    if verbose {
        eprintln!("Assembling: {}", input.display());
    }

    let output_path = input.with_extension("hack");
    if listing {
        let (binary, listing_text) = assemble_with_listing(&source)?;
        fs::write(&output_path, binary)?;
        fs::write(input.with_extension("listing.txt"), listing_text)?;
    } else {
        fs::write(&output_path, assemble(&source)?)?;
    }

    if verbose {
        eprintln!(
            "  {} lines assembled in {:.2}ms",
            source.lines().count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    println!("{} -> {}", input.display(), output_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut failed = false;
    for input in &args.inputs {
        if let Err(e) = assemble_file(input, args.listing, args.verbose) {
            eprintln!("Error processing {}: {e}", input.display());
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

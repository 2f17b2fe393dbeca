use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hack_emulator::boot;

#[derive(Parser)]
#[command(name = "HackEmulator", version, about = "Runs Hack machine code")]
struct Args {
    /// Program to execute (.hack or .bin)
    input: PathBuf,

    /// Maximum number of instructions to execute
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// RAM addresses to print after the run (repeatable)
    #[arg(long = "watch", value_name = "ADDR")]
    watch: Vec<u16>,

    /// Show per-run statistics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut cpu = match boot(&args.input) {
        Ok(cpu) => cpu,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let steps = match cpu.run(args.max_steps) {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.verbose {
        eprintln!("Executed {steps} instructions");
        if steps == args.max_steps {
            eprintln!("Stopped at the step budget; the program may not have halted");
        }
    }

    println!("PC = {}", cpu.pc());
    println!("A  = {}", cpu.a_register());
    println!("D  = {}", cpu.d_register());
    match cpu.ram(0) {
        Ok(sp) => println!("SP = {sp}"),
        Err(e) => eprintln!("error: {e}"),
    }
    for address in args.watch {
        match cpu.ram(address) {
            Ok(value) => println!("RAM[{address}] = {value}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    ExitCode::SUCCESS
}

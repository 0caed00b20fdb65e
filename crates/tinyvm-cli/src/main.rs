//! tinyvm CLI - run a program image on the console

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tinyvm_core::{
    CodeImage, CompareMode, CpuState, EndOfCode, Fault, ImageError, Machine, MachineConfig,
    RunState, StdConsole, CODE_SIZE,
};

/// Run a tinyvm program image
#[derive(Parser, Debug)]
#[command(name = "tinyvm")]
#[command(about = "Run a tinyvm program image", long_about = None)]
struct Args {
    /// Path to the program image
    image: PathBuf,

    /// CMP only ever sets the zero flag, never clears it
    #[arg(long)]
    sticky_compare: bool,

    /// Fail if the program runs off the end of the code region without HALT
    #[arg(long)]
    require_halt: bool,

    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Trace every instruction on stderr
    #[arg(long)]
    trace: bool,

    /// Dump CPU state on stderr after execution
    #[arg(short = 'c', long)]
    dump_cpu: bool,

    /// Don't print the load summary
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            compare: if self.sticky_compare {
                CompareMode::Sticky
            } else {
                CompareMode::ClearOnMismatch
            },
            end_of_code: if self.require_halt {
                EndOfCode::Fail
            } else {
                EndOfCode::Succeed
            },
            trace: self.trace,
        }
    }
}

/// Exit status for a run that halted, or ran off the end when that is allowed
const EXIT_OK: u8 = 0;
/// Image load failure, fault, or a rejected end-of-code
const EXIT_FAILURE: u8 = 1;
/// `--max-steps` ran out before the program finished
const EXIT_STEP_LIMIT: u8 = 2;

/// Exit status and stderr diagnostic for an image that failed to load
fn load_failure(error: &ImageError) -> (u8, String) {
    (EXIT_FAILURE, format!("Error loading image: {}", error))
}

/// Status line printed after a successful load
fn load_summary(image: &CodeImage) -> String {
    format!("Loaded {} bytes", image.loaded_len())
}

/// Exit status and optional stderr diagnostic for a finished run
fn run_outcome(
    result: &Result<RunState, Fault>,
    config: &MachineConfig,
    cpu: &CpuState,
    steps: u64,
) -> (u8, Option<String>) {
    match result {
        Ok(RunState::Running) => (
            EXIT_STEP_LIMIT,
            Some(format!("Step limit of {} reached at PC={}", steps, cpu.pc)),
        ),
        Ok(state) if config.accepts(*state) => (EXIT_OK, None),
        Ok(_) => (
            EXIT_FAILURE,
            Some(format!(
                "Ran off the end of the code region without HALT at PC={}",
                cpu.pc
            )),
        ),
        Err(fault) => (EXIT_FAILURE, Some(fault.to_string())),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let image = match CodeImage::load_from_file(&args.image) {
        Ok(image) => image,
        Err(e) => {
            let (code, message) = load_failure(&e);
            eprintln!("{}", message);
            return ExitCode::from(code);
        }
    };

    if image.is_truncated() {
        eprintln!(
            "warning: image is {} bytes, only the first {} were loaded",
            image.source_len(),
            CODE_SIZE
        );
    }
    if !args.quiet {
        println!("{}", load_summary(&image));
    }

    let config = args.machine_config();
    let mut machine = Machine::with_config(image, StdConsole::new(), config);

    let result = match args.max_steps {
        Some(max) => machine.run_for(max),
        None => machine.run(),
    };

    if args.dump_cpu {
        dump_cpu_state(machine.cpu(), machine.steps());
    }

    let (code, message) = run_outcome(&result, &config, machine.cpu(), machine.steps());
    if let Some(message) = message {
        eprintln!("{}", message);
    }
    ExitCode::from(code)
}

fn dump_cpu_state(cpu: &CpuState, steps: u64) {
    eprintln!("\nCPU State:");
    eprintln!("  A:     ${:04X}", cpu.a);
    eprintln!("  B:     ${:04X}", cpu.b);
    eprintln!("  C:     ${:04X}", cpu.c);
    eprintln!("  D:     ${:04X}", cpu.d);
    eprintln!("  PC:    ${:04X}", cpu.pc);
    eprintln!("  Z:     {}", cpu.zero as u8);
    eprintln!("  Steps: {}", steps);
}

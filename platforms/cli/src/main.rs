use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally::{
    histogram, multiplication, write_state_count, Bin, Mode, ProgramLoader, Sampler, Summary,
    TapeLog, TransitionTable, TuringMachine, TuringMachineError,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tally-cli run programs/unary-increment.tm -i 111
  cat programs/multiplication.tm | tally-cli run -i '1101#1101$'
  tally-cli multiply 1101 1101
  tally-cli sample 3 12 --samples 1000
  tally-cli heatmap --low 2 --high 10")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a transition program on one or more input tapes
    Run(RunArgs),
    /// Multiply two binary numbers with the embedded multiplication program
    Multiply {
        /// First operand, in binary
        a: String,
        /// Second operand, in binary
        b: String,
        /// Print the result as JSON
        #[clap(long)]
        json: bool,
    },
    /// Sample step counts of the multiplication program for two operand bit widths
    Sample {
        /// Bit width of the first operand
        a_bits: u32,
        /// Bit width of the second operand
        b_bits: u32,
        #[clap(flatten)]
        sampling: SamplingArgs,
        /// Number of histogram bins
        #[clap(long, default_value_t = 10)]
        bins: usize,
        /// Print the result as JSON
        #[clap(long)]
        json: bool,
    },
    /// Print a CSV grid of mean step counts over a range of bit widths
    Heatmap {
        /// Smallest bit width
        #[clap(long, default_value_t = 2)]
        low: u32,
        /// Largest bit width
        #[clap(long, default_value_t = 30)]
        high: u32,
        /// Sample budget per bit-width pair
        #[clap(long, default_value_t = 100)]
        samples: usize,
        /// RNG seed
        #[clap(long, default_value_t = 1108)]
        seed: u64,
        /// Worker threads
        #[clap(long, default_value_t = 1)]
        threads: usize,
        /// Abort a run after this many steps
        #[clap(long)]
        max_steps: Option<usize>,
    },
    /// Print the number of distinct states of the multiplication program
    States {
        /// Also write the count to this file
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// The program file to execute. Reads stdin when omitted or `-`
    program: Option<String>,

    /// Input tapes, one run per tape
    #[clap(short, long)]
    input: Vec<String>,

    /// Initial head offset
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    head: isize,

    /// Blank symbol
    #[clap(long, default_value_t = 'B')]
    blank: char,

    /// Wildcard symbol
    #[clap(long, default_value_t = '*')]
    wildcard: char,

    /// Next states starting with this prefix are final
    #[clap(long, default_value = "halt")]
    halt_prefix: String,

    /// Additional final state names
    #[clap(long = "final")]
    final_states: Vec<String>,

    /// Reject programs that define a (state, symbol) pair twice
    #[clap(long)]
    strict: bool,

    /// Abort a run after this many steps
    #[clap(long)]
    max_steps: Option<usize>,

    /// Append each final tape to this file
    #[clap(long)]
    log: Option<PathBuf>,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print results as JSON
    #[clap(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SamplingArgs {
    /// Sample budget per bit-width pair
    #[clap(long, default_value_t = 1000)]
    samples: usize,

    /// RNG seed
    #[clap(long, default_value_t = 1108)]
    seed: u64,

    /// Worker threads
    #[clap(long, default_value_t = 1)]
    threads: usize,

    /// Abort a run after this many steps
    #[clap(long)]
    max_steps: Option<usize>,
}

#[derive(Serialize)]
struct RunReport {
    input: String,
    steps: usize,
    tape: String,
    state: String,
}

#[derive(Serialize)]
struct ProductReport {
    a: String,
    b: String,
    product: String,
    decimal: String,
    steps: usize,
}

#[derive(Serialize)]
struct SampleReport {
    a_bits: u32,
    b_bits: u32,
    summary: Summary,
    histogram: Vec<Bin>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(command: Command) -> Result<(), TuringMachineError> {
    match command {
        Command::Run(args) => run(args),
        Command::Multiply { a, b, json } => multiply(&a, &b, json),
        Command::Sample {
            a_bits,
            b_bits,
            sampling,
            bins,
            json,
        } => sample(a_bits, b_bits, sampling, bins, json),
        Command::Heatmap {
            low,
            high,
            samples,
            seed,
            threads,
            max_steps,
        } => {
            let sampling = SamplingArgs {
                samples,
                seed,
                threads,
                max_steps,
            };
            let heatmap = sampler(sampling)?.heatmap(low, high)?;
            println!("{}", heatmap.to_csv());
            Ok(())
        }
        Command::States { output } => {
            let count = multiplication()?.state_count();
            if let Some(path) = output {
                write_state_count(&path, count)?;
            }
            println!("{}", count);
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<(), TuringMachineError> {
    let mode = if args.strict {
        Mode::Strict
    } else {
        Mode::Normal
    };
    let prefix = args.halt_prefix.clone();
    let mut builder = TransitionTable::builder()
        .blank(args.blank)
        .wildcard(args.wildcard)
        .mode(mode)
        .final_when(move |state| state.starts_with(&prefix));
    for state in &args.final_states {
        builder = builder.final_state(state.as_str());
    }

    let table = match args.program.as_deref() {
        Some(path) if path != "-" => ProgramLoader::load_table(Path::new(path), builder)?,
        _ => ProgramLoader::load_table_from_string(&read_stdin()?, builder)?,
    };

    for duplicate in table.duplicates() {
        eprintln!(
            "Warning: line {}: transition for state '{}' and symbol '{}' redefined",
            duplicate.line, duplicate.state, duplicate.symbol
        );
    }

    let mut machine = TuringMachine::new(Arc::new(table)).with_head(args.head);
    if let Some(path) = &args.log {
        machine = machine.with_sink(TapeLog::append(path)?);
    }

    let inputs = if args.input.is_empty() {
        vec![String::new()]
    } else {
        args.input.clone()
    };

    for input in inputs {
        let steps = if args.debug {
            debug_run(&mut machine, &input, args.max_steps)?
        } else {
            machine.run_with_limit(&input, args.max_steps)?
        };

        let report = RunReport {
            input,
            steps,
            tape: machine.tape_content(),
            state: machine.state().to_string(),
        };

        if args.json {
            println!("{}", to_json(&report)?);
        } else {
            println!("{}", report.tape);
            println!("Steps: {}", report.steps);
        }
    }

    Ok(())
}

/// Runs the machine, printing every configuration.
fn debug_run(
    machine: &mut TuringMachine,
    input: &str,
    max_steps: Option<usize>,
) -> Result<usize, TuringMachineError> {
    let steps = machine.run_observed(input, max_steps, |machine| {
        println!(
            "Step: {}, State: {}, Head: {}, Tape: {}",
            machine.step_count(),
            machine.state(),
            machine.head(),
            machine.tape().cells().iter().collect::<String>()
        );
    })?;

    println!("\nMachine halted.");
    Ok(steps)
}

fn multiply(a: &str, b: &str, json: bool) -> Result<(), TuringMachineError> {
    let a_value = parse_binary(a)?;
    let b_value = parse_binary(b)?;

    let mut machine = TuringMachine::new(multiplication()?);
    let (product, steps) = tally::multiply(&mut machine, a_value, b_value)?;

    let report = ProductReport {
        a: a.to_string(),
        b: b.to_string(),
        product: format!("{product:b}"),
        decimal: product.to_string(),
        steps,
    };

    if json {
        println!("{}", to_json(&report)?);
    } else {
        println!("{} * {} = {} ({})", report.a, report.b, report.product, report.decimal);
        println!("Steps: {}", report.steps);
    }

    Ok(())
}

fn sample(
    a_bits: u32,
    b_bits: u32,
    sampling: SamplingArgs,
    bins: usize,
    json: bool,
) -> Result<(), TuringMachineError> {
    let steps = sampler(sampling)?.steps_count(a_bits, b_bits)?;
    let report = SampleReport {
        a_bits,
        b_bits,
        summary: Summary::from_steps(&steps),
        histogram: histogram(&steps, bins),
    };

    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    let summary = &report.summary;
    println!("L({},{})", a_bits, b_bits);
    println!(
        "Samples: {}, Min: {}, Max: {}, Mean: {:.2}",
        summary.count, summary.min, summary.max, summary.mean
    );
    for bin in &report.histogram {
        println!("{:>10.1} - {:>10.1}: {}", bin.start, bin.end, bin.count);
    }

    Ok(())
}

fn sampler(args: SamplingArgs) -> Result<Sampler, TuringMachineError> {
    Ok(Sampler::new(multiplication()?)
        .samples(args.samples)
        .seed(args.seed)
        .threads(args.threads)
        .max_steps(args.max_steps))
}

fn parse_binary(value: &str) -> Result<u64, TuringMachineError> {
    u64::from_str_radix(value, 2)
        .map_err(|e| TuringMachineError::InvalidTape(format!("'{value}' is not binary: {e}")))
}

fn read_stdin() -> Result<String, TuringMachineError> {
    if atty::is(atty::Stream::Stdin) {
        return Err(TuringMachineError::FileError(
            "No program file given and nothing piped to stdin".to_string(),
        ));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| TuringMachineError::FileError(format!("Failed to read from stdin: {}", e)))?;
    Ok(buffer)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, TuringMachineError> {
    serde_json::to_string(value)
        .map_err(|e| TuringMachineError::FileError(format!("Failed to serialize output: {}", e)))
}

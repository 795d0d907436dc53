use clap::Parser;
use dtm::{
    analyze, check_strict, HaltReason, Machine, Program, ProgramLoader, ProgramManager,
    RunOptions, RunOutcome,
};
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Runs a deterministic single-tape Turing machine described by a rule file.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  dtm-cli demos/binary-increment.tm --log
  dtm-cli demos/invert.tm --rules
  cat demos/invert.tm | dtm-cli
  dtm-cli --builtin busy-beaver-2 --json")]
struct Cli {
    /// The rule file to execute (.tm or .json).
    /// If omitted, the program is read from stdin when it is piped.
    program: Option<String>,

    /// Run one of the built-in programs instead of a file
    #[clap(short, long, conflicts_with = "program")]
    builtin: Option<String>,

    /// List the built-in programs and exit
    #[clap(long)]
    list: bool,

    /// Print the tape after every step
    #[clap(short, long)]
    log: bool,

    /// Print the rule table before running
    #[clap(long, conflicts_with = "json")]
    rules: bool,

    /// Stop after this many steps
    #[clap(long)]
    limit: Option<usize>,

    /// Refuse to run programs with analyzer warnings
    #[clap(long)]
    strict: bool,

    /// Print the run outcome as JSON
    #[clap(long)]
    json: bool,

    /// Enable debug logging on stderr
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        for name in ProgramManager::list_program_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    let program = match load_program(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    if cli.strict {
        if let Err(e) = check_strict(&program) {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    } else {
        for warning in analyze(&program) {
            warn!(?warning, "program analysis");
        }
    }

    let mut machine = Machine::from(&program);
    if cli.rules {
        print_rules(&machine);
    }

    let outcome = if cli.json {
        machine.run(RunOptions {
            limit: cli.limit,
            trace: cli.log,
            ..RunOptions::default()
        })
    } else {
        println!("Start: {}", machine.tape());
        let outcome = if cli.log {
            run_logged(&mut machine, cli.limit)
        } else {
            machine.run(RunOptions {
                limit: cli.limit,
                ..RunOptions::default()
            })
        };
        println!("Finale: {}", machine.tape());
        outcome
    };

    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        println!(
            "{:?} after {} steps in state {} (head at {})",
            outcome.reason, outcome.steps, outcome.state, outcome.head
        );
    }

    exit_code(outcome.reason)
}

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Loads the program from `--builtin`, a file path, or piped stdin.
fn load_program(cli: &Cli) -> Result<Program, String> {
    if let Some(name) = &cli.builtin {
        ProgramManager::get_program_by_name(name).map_err(|e| e.to_string())
    } else if let Some(path) = &cli.program {
        ProgramLoader::load_program(Path::new(path)).map_err(|e| e.to_string())
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        ProgramLoader::load_program_from_string(&buffer).map_err(|e| e.to_string())
    } else {
        Err("No program given. Pass a rule file, pipe one on stdin, or use --builtin".to_string())
    }
}

fn print_rules(machine: &Machine) {
    for (i, transition) in machine.rules().iter().enumerate() {
        println!("Rule {}: {}", i + 1, transition);
    }
}

/// Steps lazily and prints the tape after every step, so endless machines still show
/// progress without a limit.
fn run_logged(machine: &mut Machine, limit: Option<usize>) -> RunOutcome {
    let mut steps = 0;
    for snapshot in machine.trace().take(limit.unwrap_or(usize::MAX)) {
        steps += 1;
        println!("{:>6}  q{:<4} ...{}...", snapshot.step, snapshot.state, snapshot.tape);
    }

    // A zero limit classifies the final configuration without stepping again.
    let mut outcome = machine.run(RunOptions::new().limit(0));
    outcome.steps = steps;
    outcome
}

fn exit_code(reason: HaltReason) -> ExitCode {
    match reason {
        HaltReason::Accepted => ExitCode::SUCCESS,
        HaltReason::Stuck => ExitCode::from(2),
        HaltReason::LimitExceeded | HaltReason::Cancelled => ExitCode::from(3),
    }
}

//! CLI tool to convert a V1 ledger file to V2 syntax.
//!
//! Usage:
//!   ledger-v1tov2 <input.ledger>
//!   ledger-v1tov2 <input.ledger> -o <output.ledger>
//!
//! If no output file is specified, writes to stdout.

use clap::{ArgAction, Parser};
use ledger_v1tov2::{MigrateError, Pipeline, migrate_text, read_input, trace_line};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, warn};

/// Convert a legacy V1 ledger file to V2 syntax.
///
/// The file is converted in full before anything is written; on error
/// nothing is emitted.
#[derive(Parser)]
#[command(name = "ledger-v1tov2")]
struct Cli {
    /// Legacy V1 ledger file
    #[arg(required_unless_present = "list_rules")]
    input: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print per-rule change counts on stderr
    #[arg(long)]
    stats: bool,

    /// Show how each rule rewrote the given line (1-based) on stderr
    #[arg(long, value_name = "LINE")]
    explain: Option<usize>,

    /// List the rules in application order and exit
    #[arg(long)]
    list_rules: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn list_rules(pipeline: &Pipeline) {
    for (index, rule) in pipeline.rules().iter().enumerate() {
        println!("{:>2}. {:<24} {}", index + 1, rule.name(), rule.summary());
    }
}

fn write_output(path: Option<&Path>, output: &str) -> Result<(), MigrateError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|source| MigrateError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(path, output).map_err(|source| MigrateError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| MigrateError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}

fn run(cli: &Cli) -> Result<(), MigrateError> {
    let pipeline = Pipeline::standard();

    if cli.list_rules {
        list_rules(pipeline);
        return Ok(());
    }

    let Some(input_path) = cli.input.as_deref() else {
        return Ok(());
    };
    let input = read_input(input_path)?;
    let migration = migrate_text(pipeline, &input)?;

    if let Some(line_number) = cli.explain {
        match trace_line(pipeline, &input, line_number)? {
            Some(trace) => eprintln!("{trace}"),
            None => warn!(line = line_number, "no such line to explain"),
        }
    }

    write_output(cli.output.as_deref(), &migration.output)?;

    if cli.stats {
        eprintln!("{}", migration.hits);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

//! Sheetcell - drive a spreadsheet from line commands

mod commands;
mod config;
mod error;

use anyhow::Context;
use clap::Parser;
use log::warn;
use sheetcell_core::Sheet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

/// Evaluate spreadsheet commands (set/get/text/clear/refs) from a file or stdin.
#[derive(Parser, Debug)]
#[command(name = "sheetcell", version, about)]
struct Cli {
    /// Command file to run (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Load configuration from this TOML file instead of the user config dir
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<usize> {
    let (config, warnings) = config::load_config(cli.config.as_ref());
    for warning in warnings {
        warn!("{}", warning);
    }

    let mut sheet = Sheet::with_config(config.sheet);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let failures = match cli.file {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            commands::run(&mut sheet, BufReader::new(file), &mut out)?
        }
        None => commands::run(&mut sheet, io::stdin().lock(), &mut out)?,
    };
    Ok(failures)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

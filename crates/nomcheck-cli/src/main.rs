#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]

mod args;

use anyhow::{Context, Result};
use args::CliArgs;
use clap::Parser;
use colored::Colorize;
use nomcheck_solver::{HierarchyDef, validate_hierarchy};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Validates the definition and prints one line per finding. Returns the
/// finding count.
fn run(args: &CliArgs) -> Result<usize> {
    let text = std::fs::read_to_string(&args.definition)
        .with_context(|| format!("failed to read {}", args.definition.display()))?;
    let def: HierarchyDef = serde_json::from_str(&text).with_context(|| {
        format!(
            "{} is not a valid hierarchy definition",
            args.definition.display()
        )
    })?;
    debug!(types = def.len(), "loaded hierarchy definition");

    let issues = validate_hierarchy(&def);
    for issue in &issues {
        println!("{} {issue}", "error:".red().bold());
    }
    if !args.quiet {
        if issues.is_empty() {
            println!(
                "{} {} type(s), no problems found",
                "ok:".green().bold(),
                def.len()
            );
        } else {
            println!("{} problem(s) found", issues.len());
        }
    }
    Ok(issues.len())
}

/// Initialises the tracing subscriber. Does nothing with no `-v` flag and
/// neither NOMCHECK_LOG nor RUST_LOG set. All output goes to stderr so it
/// never interferes with the findings on stdout.
fn init_tracing(verbose: u8) {
    let filter = if let Ok(val) = std::env::var("NOMCHECK_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => return,
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the nomcheck binary.
#[derive(Parser, Debug)]
#[command(
    name = "nomcheck",
    version,
    about = "Validate a nominal type hierarchy definition"
)]
pub struct CliArgs {
    /// Path to a JSON hierarchy definition.
    pub definition: PathBuf,

    /// Print findings only, without the summary line.
    #[arg(short, long)]
    pub quiet: bool,

    /// Raise the log level (-v: debug, -vv: trace). NOMCHECK_LOG and
    /// RUST_LOG take precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

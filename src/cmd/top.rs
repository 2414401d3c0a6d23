use clap::Parser;

use super::LogArgs;

/// Prints the addresses with the largest byte totals from reducer output on
/// stdin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// How many addresses to print
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    #[command(flatten)]
    pub log: LogArgs,
}

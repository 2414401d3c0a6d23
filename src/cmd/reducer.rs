use clap::Parser;

use super::LogArgs;

/// Reads `<address>\t<bytes>` lines grouped by address from stdin and writes
/// one `<address>\t<total>` line per address to stdout.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub log: LogArgs,
}

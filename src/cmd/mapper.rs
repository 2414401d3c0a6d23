use clap::Parser;

use super::{parse_delimiter, LogArgs};
use crate::mapper::MapperConfig;

/// Reads flow records from stdin and writes `<address>\t<bytes>` lines to
/// stdout, one per source and destination address.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Field delimiter of the input rows
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Treat the first row as data even if it is the canonical header
    #[arg(long)]
    pub no_header_detect: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl Args {
    pub fn config(&self) -> MapperConfig {
        MapperConfig {
            delimiter: self.delimiter,
            detect_header: !self.no_header_detect,
        }
    }
}

use std::path::PathBuf;

use clap::Parser;

use super::{parse_delimiter, LogArgs};
use crate::prepare::PrepareConfig;

/// Normalizes a flow dataset's columns to `ip.src,ip.dst,frame.len`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Raw dataset CSV (with a header row)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV path for cleaned logs
    #[arg(short, long, default_value = "logs.csv")]
    pub output: PathBuf,

    /// Field delimiter of the raw dataset
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Drop rows whose byte count is not an integer instead of keeping them as-is
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub log: LogArgs,
}

impl Args {
    pub fn config(&self) -> PrepareConfig {
        PrepareConfig {
            delimiter: self.delimiter,
            strict: self.strict,
        }
    }
}

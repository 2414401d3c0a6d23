//! Command-line arguments for each binary.

use clap::Args;

pub mod mapper;
pub mod prepare;
pub mod reducer;
pub mod top;

/// Logging flags shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Parses a single-byte field delimiter. `\t` and `tab` mean a tab.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got `{s}`")),
    }
}

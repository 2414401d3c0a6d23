use anyhow::Result;
use clap::Parser;
use std::io;
use toptalkers::cmd::reducer::Args;
use toptalkers::{logging, reducer};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log.log_level);

    let stats = reducer::run(io::stdin().lock(), io::stdout().lock())?;
    info!(
        phase = "reduce",
        lines = stats.lines_in,
        skipped = stats.lines_skipped,
        groups = stats.groups,
        "Reduce complete"
    );
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::io;
use toptalkers::cmd::mapper::Args;
use toptalkers::{logging, mapper};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log.log_level);

    let stats = mapper::run(io::stdin().lock(), io::stdout().lock(), &args.config())?;
    info!(
        phase = "map",
        records = stats.records_read,
        skipped = stats.records_skipped,
        emissions = stats.emissions,
        header = stats.header_skipped,
        "Map complete"
    );
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use toptalkers::cmd::top::Args;
use toptalkers::{logging, top};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log.log_level);

    let ranked = top::top_n(io::stdin().lock(), args.count)?;
    let mut out = BufWriter::new(io::stdout().lock());
    for entry in ranked {
        writeln!(out, "{entry}").context("failed to write ranking")?;
    }
    out.flush()?;
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use toptalkers::cmd::prepare::Args;
use toptalkers::{logging, prepare};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log.log_level);

    let stats = prepare::prepare_file(&args.input, &args.output, &args.config())?;
    println!("Wrote cleaned logs to {} [{} rows]", args.output.display(), stats.rows_written);
    Ok(())
}

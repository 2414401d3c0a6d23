use anyhow::Result;
use clap::Parser;
use toptalkers::standalone::{engine, Args, Job};
use toptalkers::{logging, workload};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log.log_level);

    let job = Job::from(args.command);
    let engine = workload::named(&job.workload)?;
    info!(input = %job.input, workload = %job.workload, n_reduce = job.n_reduce, "starting job");
    let stats = engine::run_job(&job, &engine)?;
    info!(?stats, output = %job.output, "job complete");
    Ok(())
}

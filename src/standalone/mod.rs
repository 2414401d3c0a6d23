//! Runs a whole job on one machine: map every input file, group the pairs by
//! key, reduce each group. This is the local stand-in for the sort-and-group
//! framework the streaming binaries normally run under.

use clap::{Parser, Subcommand};

use crate::cmd::LogArgs;

pub mod engine;

/// Number of reduce buckets when none is given.
pub const DEFAULT_N_REDUCE: u32 = 11;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job locally
    Submit {
        /// Glob spec for the input files
        #[arg(short, long)]
        input: String,

        /// Name of the workload
        #[arg(short, long, default_value = "top-talkers")]
        workload: String,

        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of reduce buckets (one output file each)
        #[arg(short = 'r', long, default_value_t = DEFAULT_N_REDUCE, value_parser = clap::value_parser!(u32).range(1..))]
        reducers: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub workload: String,
    pub output: String,
    pub n_reduce: u32,
}

impl From<Commands> for Job {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Submit {
                input,
                workload,
                output,
                reducers,
            } => Job {
                input,
                workload,
                output,
                n_reduce: reducers,
            },
        }
    }
}

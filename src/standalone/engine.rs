use anyhow::{bail, Context, Result};
use dashmap::DashMap;
use glob::glob;
use itertools::Itertools;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

use crate::standalone::Job;
use crate::*;

// types related to this engine
type BucketIndex = u32;
pub type Buckets = DashMap<BucketIndex, Vec<KeyValue>>;

/// Summary of one local run, written next to the output as `_stats.json`.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub input_files: u64,
    pub pairs: u64,
    pub buckets: u64,
    pub groups: u64,
}

pub const STATS_FILE: &str = "_stats.json";

/// Maps every file matching the job's input glob and partitions the emitted
/// pairs into `ihash(key) % n_reduce` buckets.
///
/// Fails if no file matches, so a mistyped path is not mistaken for an empty
/// dataset.
pub fn perform_map(job: &Job, engine: &Workload, stats: &mut JobStats) -> Result<Buckets> {
    let buckets: Buckets = Buckets::new();
    let input_files = glob(&job.input).with_context(|| format!("bad input pattern `{}`", job.input))?;
    for pathspec in input_files.flatten() {
        if !pathspec.is_file() {
            continue;
        }
        let file = File::open(&pathspec).with_context(|| format!("failed to open {}", pathspec.display()))?;
        let mut reader = BufReader::new(file);
        let mut pairs = 0u64;
        let mut emit = |kv: KeyValue| {
            let bucket_no = ihash(&kv.key) % job.n_reduce;
            buckets.entry(bucket_no).or_default().push(kv);
            pairs += 1;
        };
        (engine.map_fn)(&mut reader, &mut emit).with_context(|| format!("map failed on {}", pathspec.display()))?;
        debug!(file = %pathspec.display(), pairs, "mapped input file");
        stats.input_files += 1;
        stats.pairs += pairs;
    }
    if stats.input_files == 0 {
        bail!("no input files match `{}`", job.input);
    }
    info!(phase = "map", files = stats.input_files, pairs = stats.pairs, "Map phase complete");
    Ok(buckets)
}

/// Groups each bucket by key and writes the reduce output to
/// `<output>/mr-out-<bucket>`.
///
/// Sorting a bucket is what makes equal keys contiguous; keys come out in
/// byte order within each file.
pub fn perform_reduce(job: &Job, engine: &Workload, buckets: Buckets, stats: &mut JobStats) -> Result<()> {
    let output_dir = Path::new(&job.output);
    fs::create_dir_all(output_dir).with_context(|| format!("failed to create {}", output_dir.display()))?;
    for (reduce_id, mut bkt) in buckets.into_iter() {
        let out_pathspec = output_dir.join(format!("mr-out-{}", reduce_id));
        let mut out_file = BufWriter::new(
            File::create(&out_pathspec).with_context(|| format!("failed to create {}", out_pathspec.display()))?,
        );
        bkt.sort_by_key(KeyValue::key);
        for (key, value_group) in &bkt.into_iter().chunk_by(KeyValue::key) {
            let iter = value_group.map(KeyValue::into_value);
            let out = (engine.reduce_fn)(key, Box::new(iter))?;
            out_file.write_all(&out)?;
            stats.groups += 1;
        }
        out_file.flush()?;
        stats.buckets += 1;
    }
    info!(phase = "reduce", buckets = stats.buckets, groups = stats.groups, "Reduce phase complete");
    Ok(())
}

/// Runs `job` end to end and records its [`JobStats`] in the output directory.
pub fn run_job(job: &Job, engine: &Workload) -> Result<JobStats> {
    let mut stats = JobStats::default();
    let buckets = perform_map(job, engine, &mut stats)?;
    perform_reduce(job, engine, buckets, &mut stats)?;
    let stats_path = Path::new(&job.output).join(STATS_FILE);
    fs::write(&stats_path, serde_json::to_vec_pretty(&stats)?)
        .with_context(|| format!("failed to write {}", stats_path.display()))?;
    Ok(stats)
}

//! Record source normalization.
//!
//! Flow datasets name their columns in many ways. This module maps known
//! aliases onto the canonical `ip.src`, `ip.dst`, `frame.len` columns and
//! writes a three-column CSV the mapper can consume. Missing columns are a
//! hard error: nothing is written from a dataset we cannot interpret.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::{parse_byte_count, BYTES_COLUMN, CANONICAL_HEADER, DEST_COLUMN, SOURCE_COLUMN};

/// Known input column names and the canonical column each stands for.
///
/// New dataset layouts only need a new row here.
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("Source IP", SOURCE_COLUMN),
    ("Src IP", SOURCE_COLUMN),
    ("srcip", SOURCE_COLUMN),
    ("src_ip", SOURCE_COLUMN),
    (SOURCE_COLUMN, SOURCE_COLUMN),
    ("Destination IP", DEST_COLUMN),
    ("Dst IP", DEST_COLUMN),
    ("dstip", DEST_COLUMN),
    ("dst_ip", DEST_COLUMN),
    (DEST_COLUMN, DEST_COLUMN),
    ("Frame Length", BYTES_COLUMN),
    ("Bytes", BYTES_COLUMN),
    ("Total Bytes", BYTES_COLUMN),
    ("bytes", BYTES_COLUMN),
    (BYTES_COLUMN, BYTES_COLUMN),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    #[error("input file {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("dataset missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

/// The canonical column `column` maps to, if it is a known alias.
pub fn canonical_name(column: &str) -> Option<&'static str> {
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == column)
        .map(|(_, canonical)| *canonical)
}

/// Positions of the canonical columns within `headers`, in canonical order.
///
/// When several input columns map to the same canonical name, the leftmost
/// one wins.
pub fn locate_columns(headers: &StringRecord) -> Result<[usize; 3], PrepareError> {
    let mut found: [Option<usize>; 3] = [None; 3];
    for (idx, column) in headers.iter().enumerate() {
        let Some(canonical) = canonical_name(column.trim()) else {
            continue;
        };
        if let Some(slot) = CANONICAL_HEADER.iter().position(|name| *name == canonical) {
            found[slot].get_or_insert(idx);
        }
    }
    let missing: Vec<&'static str> = CANONICAL_HEADER
        .iter()
        .zip(found)
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(PrepareError::MissingColumns(missing));
    }
    Ok(found.map(|idx| idx.unwrap_or_default()))
}

/// Finds the input file, falling back to a lower-cased file name in the same
/// directory.
pub fn resolve_input(path: &Path) -> Result<PathBuf, PrepareError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    let lowered = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| path.with_file_name(name.to_lowercase()));
    match lowered {
        Some(alt) if alt.is_file() => {
            debug!(requested = %path.display(), using = %alt.display(), "falling back to lower-case file name");
            Ok(alt)
        }
        _ => Err(PrepareError::NotFound(path.to_path_buf())),
    }
}

/// An integral byte count in canonical form, or [`None`] when the value is
/// not a non-negative whole number. Whole-valued decimals such as `1500.0`
/// count as integral.
pub fn coerce_byte_count(raw: &str) -> Option<u64> {
    if let Some(n) = parse_byte_count(raw) {
        return Some(n);
    }
    let f: f64 = raw.trim().parse().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct PrepareConfig {
    /// Field delimiter of the raw dataset.
    pub delimiter: u8,
    /// Drop rows whose byte count cannot be made an integer instead of
    /// passing the raw value through.
    pub strict: bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            strict: false,
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrepareStats {
    pub rows_read: u64,
    pub rows_written: u64,
    /// Rows whose byte count was written verbatim because it is not integral.
    pub bytes_unconverted: u64,
    /// Rows dropped in strict mode.
    pub rows_dropped: u64,
}

/// Normalizes a dataset with a header row from `input` into canonical CSV on
/// `output`.
///
/// Fails with [`PrepareError::MissingColumns`] before writing anything if the
/// header lacks a required column.
pub fn normalize<R: Read, W: Write>(input: R, output: W, config: &PrepareConfig) -> Result<PrepareStats> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(config.delimiter)
        .from_reader(input);
    let headers = reader.headers().context("failed to read dataset header")?.clone();
    let [src_idx, dst_idx, len_idx] = locate_columns(&headers)?;
    debug!(src_idx, dst_idx, len_idx, "located canonical columns");

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(CANONICAL_HEADER)?;

    let mut stats = PrepareStats::default();
    for result in reader.records() {
        let record = result.context("failed to read dataset row")?;
        stats.rows_read += 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let raw_len = field(len_idx);
        let coerced = coerce_byte_count(raw_len).map(|n| n.to_string());
        let frame_len = match coerced {
            Some(ref n) => n.as_str(),
            None if config.strict => {
                stats.rows_dropped += 1;
                continue;
            }
            None => {
                stats.bytes_unconverted += 1;
                raw_len
            }
        };
        writer.write_record([field(src_idx), field(dst_idx), frame_len])?;
        stats.rows_written += 1;
    }
    writer.flush().context("failed to flush normalized output")?;

    if stats.bytes_unconverted > 0 {
        warn!(
            rows = stats.bytes_unconverted,
            "some byte counts are not integers and were written unchanged; the mapper will skip them"
        );
    }
    Ok(stats)
}

/// Normalizes the dataset at `input` into a new CSV file at `output`.
pub fn prepare_file(input: &Path, output: &Path, config: &PrepareConfig) -> Result<PrepareStats> {
    let input = resolve_input(input)?;
    let reader = File::open(&input).with_context(|| format!("failed to open {}", input.display()))?;
    info!(input = %input.display(), "reading dataset");

    // Validate the header before creating the output so a bad dataset leaves
    // no partial file behind.
    let mut probe = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(config.delimiter)
        .from_reader(File::open(&input)?);
    locate_columns(probe.headers().context("failed to read dataset header")?)?;

    let writer = File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let stats = normalize(reader, writer, config)?;
    info!(output = %output.display(), rows = stats.rows_written, "wrote cleaned logs");
    Ok(stats)
}

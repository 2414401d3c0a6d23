//! The map stage: flow records in, `<address>\t<bytes>` emissions out.
//!
//! The mapper is stateless across records. The only lookahead is the first
//! record, which is peeked to decide whether it is the canonical header; the
//! input never needs to be seekable.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, trace};

use crate::record::{Emission, FlowRecord, CANONICAL_HEADER};

/// Knobs for reading mapper input.
#[derive(Clone, Debug)]
pub struct MapperConfig {
    /// Field delimiter of the input rows.
    pub delimiter: u8,
    /// Drop the first record when it is the canonical header.
    pub detect_header: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            detect_header: true,
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MapStats {
    pub header_skipped: bool,
    pub records_read: u64,
    pub records_skipped: u64,
    pub emissions: u64,
}

/// Whether the leading fields of `record` are exactly the canonical column
/// names in canonical order.
pub fn is_canonical_header(record: &StringRecord) -> bool {
    record.len() >= CANONICAL_HEADER.len()
        && record.iter().zip(CANONICAL_HEADER).all(|(field, name)| field == name)
}

/// Runs the mapper over `input`, handing each emission to `emit` in input
/// order.
///
/// Malformed rows are skipped and counted. Errors come only from the
/// underlying reader or from `emit`.
pub fn map_records<R, F>(input: R, config: &MapperConfig, mut emit: F) -> Result<MapStats>
where
    R: Read,
    F: FnMut(Emission) -> Result<()>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter)
        .from_reader(input);
    let mut records = reader.records().peekable();
    let mut stats = MapStats::default();

    if config.detect_header && matches!(records.peek(), Some(Ok(first)) if is_canonical_header(first)) {
        records.next();
        stats.header_skipped = true;
    }

    for result in records {
        stats.records_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e).context("failed to read mapper input"),
            Err(e) => {
                debug!(error = %e, "skipping unreadable record");
                stats.records_skipped += 1;
                continue;
            }
        };
        let Some(flow) = FlowRecord::from_fields(record.iter()) else {
            trace!(?record, "skipping malformed record");
            stats.records_skipped += 1;
            continue;
        };
        for emission in flow.emissions() {
            emit(emission)?;
            stats.emissions += 1;
        }
    }

    Ok(stats)
}

/// Runs the mapper from `input` to `output`, one `<address>\t<bytes>` line per
/// emission.
pub fn run<R: Read, W: Write>(input: R, output: W, config: &MapperConfig) -> Result<MapStats> {
    let mut output = std::io::BufWriter::new(output);
    let stats = map_records(input, config, |emission| {
        writeln!(output, "{emission}").context("failed to write mapper output")
    })?;
    output.flush().context("failed to flush mapper output")?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_str(input: &str) -> (Vec<String>, MapStats) {
        let mut out = Vec::new();
        let stats = run(input.as_bytes(), &mut out, &MapperConfig::default()).unwrap();
        let lines = String::from_utf8(out).unwrap().lines().map(str::to_string).collect();
        (lines, stats)
    }

    #[test]
    fn emits_source_then_destination_in_input_order() {
        let (lines, stats) = map_str("1.1.1.1,2.2.2.2,100\n1.1.1.1,3.3.3.3,50\n");
        assert_eq!(lines, ["1.1.1.1\t100", "2.2.2.2\t100", "1.1.1.1\t50", "3.3.3.3\t50"]);
        assert_eq!(stats.emissions, 4);
        assert!(!stats.header_skipped);
    }

    #[test]
    fn canonical_header_is_dropped() {
        let (lines, stats) = map_str("ip.src,ip.dst,frame.len\na,b,1\n");
        assert_eq!(lines, ["a\t1", "b\t1"]);
        assert!(stats.header_skipped);
        assert_eq!(stats.records_read, 1);
    }

    #[test]
    fn non_header_first_row_is_data() {
        let (lines, _) = map_str("src,dst,bytes\na,b,1\n");
        // "bytes" is not an integer, so the row is skipped as data, not as a header
        assert_eq!(lines, ["a\t1", "b\t1"]);

        let (lines, stats) = map_str("9.9.9.9,8.8.8.8,7\n");
        assert_eq!(lines, ["9.9.9.9\t7", "8.8.8.8\t7"]);
        assert_eq!(stats.records_skipped, 0);
    }

    #[test]
    fn header_detection_can_be_disabled() {
        let mut out = Vec::new();
        let config = MapperConfig {
            detect_header: false,
            ..MapperConfig::default()
        };
        let stats = run("ip.src,ip.dst,frame.len\na,b,1\n".as_bytes(), &mut out, &config).unwrap();
        assert!(!stats.header_skipped);
        assert_eq!(stats.records_skipped, 1);
        assert_eq!(stats.emissions, 2);
    }

    #[test]
    fn emission_counts_per_record() {
        assert_eq!(map_str("a,b,10\n").0.len(), 2);
        assert_eq!(map_str("a,,10\n").0.len(), 1);
        assert_eq!(map_str(",b,10\n").0.len(), 1);
        assert_eq!(map_str("a,b,ten\n").0.len(), 0);
        assert_eq!(map_str("a,b\n").0.len(), 0);
    }

    #[test]
    fn malformed_rows_do_not_stop_the_stream() {
        let (lines, stats) = map_str("a,b\nx,y,oops\nc,d,5\n");
        assert_eq!(lines, ["c\t5", "d\t5"]);
        assert_eq!(stats.records_read, 3);
        assert_eq!(stats.records_skipped, 2);
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut input = b"a,b,1\n".to_vec();
        input.extend_from_slice(b"\xff\xfe,b,2\n");
        input.extend_from_slice(b"c,d,3\n");
        let mut out = Vec::new();
        let stats = run(input.as_slice(), &mut out, &MapperConfig::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t1\nb\t1\nc\t3\nd\t3\n");
        assert_eq!(stats.records_skipped, 1);
    }

    #[test]
    fn honors_custom_delimiter() {
        let mut out = Vec::new();
        let config = MapperConfig {
            delimiter: b'\t',
            ..MapperConfig::default()
        };
        run("a\tb\t4\n".as_bytes(), &mut out, &config).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t4\nb\t4\n");
    }

    #[test]
    fn quoted_fields_are_unwrapped() {
        let (lines, _) = map_str("\"10.0.0.1\",\"10.0.0.2\",\"64\"\n");
        assert_eq!(lines, ["10.0.0.1\t64", "10.0.0.2\t64"]);
    }
}

//! The reduce stage: a single-pass grouped sum over `<address>\t<bytes>` lines.
//!
//! Input must have all lines for one address adjacent to each other. Groups
//! do not need to be sorted; output follows the order in which groups first
//! appear. Memory use is one [`AggregationState`] regardless of input size.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{trace, warn};

use crate::record::Emission;
use crate::utils::for_each_line;

/// The running key and total of the group currently being reduced.
///
/// Each reduce pass owns its own state, so any number of passes can run side
/// by side.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct AggregationState {
    current_key: Option<String>,
    current_total: u64,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key of the group in progress, if any.
    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    /// Folds one emission into the state.
    ///
    /// Returns the completed group when `emission` starts a new key.
    pub fn push(&mut self, emission: Emission) -> Option<Emission> {
        if self.current_key.as_deref() == Some(emission.address.as_str()) {
            self.current_total = self.current_total.checked_add(emission.byte_count).unwrap_or_else(|| {
                warn!(address = %emission.address, "byte total overflowed, saturating");
                u64::MAX
            });
            return None;
        }
        let finished = self.take_group();
        self.current_key = Some(emission.address);
        self.current_total = emission.byte_count;
        finished
    }

    /// Flushes the group in progress at end of input.
    pub fn finish(mut self) -> Option<Emission> {
        self.take_group()
    }

    fn take_group(&mut self) -> Option<Emission> {
        let total = std::mem::take(&mut self.current_total);
        self.current_key.take().map(|key| Emission::new(key, total))
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReduceStats {
    pub lines_in: u64,
    pub lines_skipped: u64,
    pub groups: u64,
}

/// Reduces grouped `<address>\t<bytes>` lines from `input`, handing each
/// `(address, total)` to `emit` as its group ends.
///
/// Lines that do not parse are skipped without touching the running total.
pub fn reduce_lines<R, F>(input: R, mut emit: F) -> Result<ReduceStats>
where
    R: BufRead,
    F: FnMut(Emission) -> Result<()>,
{
    let mut state = AggregationState::new();
    let mut stats = ReduceStats::default();

    for_each_line(input, |line| {
        stats.lines_in += 1;
        let Some(emission) = std::str::from_utf8(line).ok().and_then(Emission::parse_line) else {
            trace!(line = %String::from_utf8_lossy(line).trim_end(), "skipping malformed line");
            stats.lines_skipped += 1;
            return Ok(());
        };
        if let Some(group) = state.push(emission) {
            stats.groups += 1;
            emit(group)?;
        }
        Ok(())
    })?;

    if let Some(group) = state.finish() {
        stats.groups += 1;
        emit(group)?;
    }

    Ok(stats)
}

/// Runs the reducer from `input` to `output`, one `<address>\t<total>` line
/// per group.
pub fn run<R: BufRead, W: Write>(input: R, output: W) -> Result<ReduceStats> {
    let mut output = std::io::BufWriter::new(output);
    let stats = reduce_lines(input, |group| {
        writeln!(output, "{group}").context("failed to write reducer output")
    })?;
    output.flush().context("failed to flush reducer output")?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce_str(input: &str) -> String {
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn sums_contiguous_groups() {
        let out = reduce_str("1.1.1.1\t100\n1.1.1.1\t50\n2.2.2.2\t100\n3.3.3.3\t50\n");
        assert_eq!(out, "1.1.1.1\t150\n2.2.2.2\t100\n3.3.3.3\t50\n");
    }

    #[test]
    fn last_group_is_flushed() {
        assert_eq!(reduce_str("a\t1\nb\t2\nb\t3\n"), "a\t1\nb\t5\n");
        assert_eq!(reduce_str("only\t9"), "only\t9\n");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(reduce_str(""), "");
        assert_eq!(reduce_str("garbage\n\n"), "");
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        assert_eq!(reduce_str("z\t1\nz\t1\na\t5\nm\t2\n"), "z\t2\na\t5\nm\t2\n");
    }

    #[test]
    fn within_group_order_does_not_matter() {
        let forward = reduce_str("k\t1\nk\t20\nk\t300\n");
        let backward = reduce_str("k\t300\nk\t20\nk\t1\n");
        assert_eq!(forward, "k\t321\n");
        assert_eq!(forward, backward);
    }

    #[test]
    fn malformed_lines_do_not_disturb_running_total() {
        let out = reduce_str("k\t10\nk\n\nk\tnope\nk\t1\t2\nk\t5\nj\t1\n");
        assert_eq!(out, "k\t15\nj\t1\n");
    }

    #[test]
    fn reducing_reduced_output_is_identity() {
        let once = reduce_str("a\t1\na\t2\nb\t3\nc\t4\nc\t4\n");
        assert_eq!(reduce_str(&once), once);
    }

    #[test]
    fn non_contiguous_key_produces_two_groups() {
        // contiguity is the caller's job; the reducer does not look back
        assert_eq!(reduce_str("a\t1\nb\t1\na\t1\n"), "a\t1\nb\t1\na\t1\n");
    }

    #[test]
    fn tolerates_crlf_and_invalid_utf8() {
        let mut input = b"a\t1\r\n".to_vec();
        input.extend_from_slice(b"\xff\t2\n");
        input.extend_from_slice(b"a\t2\r\n");
        let mut out = Vec::new();
        let stats = run(input.as_slice(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\t3\n");
        assert_eq!(stats, ReduceStats { lines_in: 3, lines_skipped: 1, groups: 1 });
    }

    #[test]
    fn states_are_independent() {
        let mut left = AggregationState::new();
        let mut right = AggregationState::new();
        assert_eq!(left.push(Emission::new("x", 1)), None);
        assert_eq!(right.push(Emission::new("y", 2)), None);
        assert_eq!(left.push(Emission::new("x", 1)), None);
        assert_eq!(left.current_key(), Some("x"));
        assert_eq!(left.finish(), Some(Emission::new("x", 2)));
        assert_eq!(right.finish(), Some(Emission::new("y", 2)));
    }

    #[test]
    fn key_change_returns_finished_group() {
        let mut state = AggregationState::new();
        assert_eq!(state.push(Emission::new("a", 4)), None);
        assert_eq!(state.push(Emission::new("b", 1)), Some(Emission::new("a", 4)));
        assert_eq!(state.finish(), Some(Emission::new("b", 1)));
        assert_eq!(AggregationState::new().finish(), None);
    }

    #[test]
    fn total_saturates_instead_of_wrapping() {
        let mut state = AggregationState::new();
        state.push(Emission::new("big", u64::MAX));
        state.push(Emission::new("big", 1));
        assert_eq!(state.finish(), Some(Emission::new("big", u64::MAX)));
    }
}

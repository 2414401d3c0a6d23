//! Ranks reducer output to find the top talkers.
//!
//! Only the `n` best entries are held at any time, so arbitrarily long
//! reducer output ranks in O(n) memory.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::BufRead;

use anyhow::Result;
use tracing::trace;

use crate::record::Emission;
use crate::utils::for_each_line;

/// Heap entry ordered by total, then by address with the smaller address
/// ranking higher.
type Rank = (u64, Reverse<String>);

/// The `n` addresses with the largest totals, largest first. Ties are broken
/// by address, ascending.
///
/// Input lines use the reducer's `<address>\t<total>` format; lines that do
/// not parse are skipped.
pub fn top_n<R: BufRead>(input: R, n: usize) -> Result<Vec<Emission>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut heap: BinaryHeap<Reverse<Rank>> = BinaryHeap::new();

    for_each_line(input, |line| {
        let Some(entry) = std::str::from_utf8(line).ok().and_then(Emission::parse_line) else {
            trace!("skipping malformed line");
            return Ok(());
        };
        heap.push(Reverse((entry.byte_count, Reverse(entry.address))));
        if heap.len() > n {
            heap.pop();
        }
        Ok(())
    })?;

    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse((total, Reverse(address)))| Emission::new(address, total))
        .collect())
}

//! Top talkers by bandwidth, as a streaming MapReduce job.
//!
//! The mapper turns network-flow records (source address, destination
//! address, byte count) into `<address>\t<bytes>` pairs, and the reducer folds
//! contiguous runs of equal addresses into one total per address. Both run as
//! plain stdin/stdout filters so a sort-and-group framework (Hadoop Streaming
//! or `sort`) can sit between them; the [`standalone`] engine plays that role
//! locally.

use bytes::Bytes;
use std::hash::Hasher;

pub mod cmd;
pub mod logging;
pub mod mapper;
pub mod prepare;
pub mod record;
pub mod reducer;
pub mod standalone;
pub mod top;
pub mod utils;
pub mod workload;

pub use record::{Emission, FlowRecord, CANONICAL_HEADER};

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function reads one input split and hands every key-value pair it
/// produces to `emit`, in production order.
///
/// Row-level problems are the map function's business; an `Err` means the
/// split itself could not be read.
pub type MapFn = fn(input: &mut dyn std::io::BufRead, emit: &mut dyn FnMut(KeyValue)) -> anyhow::Result<()>;

/// A reduce function takes in a key and an iterator over the values for that
/// key. It returns the bytes to append to the reduce output file.
pub type ReduceFn = fn(key: Bytes, values: Box<dyn Iterator<Item = Bytes> + '_>) -> anyhow::Result<Bytes>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: Bytes,
    /// The value.
    pub value: Bytes,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    /// Get the key of this key-value pair.
    ///
    /// This method is cheap, since [`Bytes`] are cheaply cloneable.
    #[inline]
    pub fn key(&self) -> Bytes {
        self.key.clone()
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> Bytes {
        self.value
    }
}

impl From<Emission> for KeyValue {
    fn from(emission: Emission) -> Self {
        let value = Bytes::from(emission.byte_count.to_string());
        Self::new(Bytes::from(emission.address), value)
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    (hasher.finish() & 0x7fff_ffff) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ihash_is_stable_and_positive() {
        let a = ihash(b"10.0.0.1");
        assert_eq!(a, ihash(b"10.0.0.1"));
        assert!(a <= 0x7fff_ffff);
    }

    #[test]
    fn emission_converts_to_textual_key_value() {
        let kv = KeyValue::from(Emission::new("1.1.1.1", 100));
        assert_eq!(kv.key(), Bytes::from_static(b"1.1.1.1"));
        assert_eq!(kv.into_value(), Bytes::from_static(b"100"));
    }
}

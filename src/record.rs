//! The record formats shared by the mapper, the reducer and the record source.
//!
//! Mapper input is a delimited row `ip.src, ip.dst, frame.len`; the line
//! format between mapper and reducer (and the reducer's own output) is
//! `<address>\t<bytes>`.

use std::fmt;

/// Canonical column names, in the order the mapper expects them.
pub const CANONICAL_HEADER: [&str; 3] = [SOURCE_COLUMN, DEST_COLUMN, BYTES_COLUMN];

pub const SOURCE_COLUMN: &str = "ip.src";
pub const DEST_COLUMN: &str = "ip.dst";
pub const BYTES_COLUMN: &str = "frame.len";

/// Separator between key and value on intermediate and output lines.
pub const FIELD_SEPARATOR: char = '\t';

/// Parses a byte count the way both stages agree on: an unsigned decimal
/// integer, surrounding whitespace ignored.
pub fn parse_byte_count(s: &str) -> Option<u64> {
    s.trim().parse().ok()
}

/// One validated row of the flow log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowRecord {
    pub source_address: String,
    pub dest_address: String,
    pub byte_count: u64,
}

impl FlowRecord {
    /// Builds a record from the leading fields of a row.
    ///
    /// Returns [`None`] for rows with fewer than three fields or with a byte
    /// count that is not an unsigned integer. Fields past the third are
    /// ignored.
    pub fn from_fields<'a, I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fields = fields.into_iter();
        let source = fields.next()?;
        let dest = fields.next()?;
        let byte_count = parse_byte_count(fields.next()?)?;
        Some(Self {
            source_address: source.to_string(),
            dest_address: dest.to_string(),
            byte_count,
        })
    }

    /// The emissions for this record: source first, then destination, each
    /// only when the address is non-empty.
    pub fn emissions(self) -> impl Iterator<Item = Emission> {
        let byte_count = self.byte_count;
        [self.source_address, self.dest_address]
            .into_iter()
            .filter(|address| !address.is_empty())
            .map(move |address| Emission { address, byte_count })
    }
}

/// A single `(address, bytes)` pair on its way from mapper to reducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emission {
    pub address: String,
    pub byte_count: u64,
}

impl Emission {
    pub fn new(address: impl Into<String>, byte_count: u64) -> Self {
        Self {
            address: address.into(),
            byte_count,
        }
    }

    /// Parses an `<address>\t<bytes>` line.
    ///
    /// Trailing whitespace (including the line terminator) is stripped first.
    /// Everything after the first tab must be the byte count, so a line with a
    /// third field is rejected. An empty address is rejected too.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (address, bytes) = line.trim_end().split_once(FIELD_SEPARATOR)?;
        if address.is_empty() {
            return None;
        }
        let byte_count = parse_byte_count(bytes)?;
        Some(Self::new(address, byte_count))
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.address, FIELD_SEPARATOR, self.byte_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_needs_three_fields() {
        assert_eq!(FlowRecord::from_fields(["1.1.1.1", "2.2.2.2"]), None);
        assert!(FlowRecord::from_fields(["1.1.1.1", "2.2.2.2", "7", "extra"]).is_some());
    }

    #[test]
    fn record_rejects_bad_byte_counts() {
        for bad in ["", "abc", "-5", "1.5", "10 20"] {
            assert_eq!(FlowRecord::from_fields(["a", "b", bad]), None, "{bad:?}");
        }
        let rec = FlowRecord::from_fields(["a", "b", " 42 "]).unwrap();
        assert_eq!(rec.byte_count, 42);
    }

    #[test]
    fn emissions_skip_empty_addresses() {
        let both = FlowRecord::from_fields(["a", "b", "3"]).unwrap();
        assert_eq!(
            both.emissions().collect::<Vec<_>>(),
            vec![Emission::new("a", 3), Emission::new("b", 3)]
        );
        let dest_only = FlowRecord::from_fields(["", "b", "3"]).unwrap();
        assert_eq!(dest_only.emissions().count(), 1);
        let neither = FlowRecord::from_fields(["", "", "3"]).unwrap();
        assert_eq!(neither.emissions().count(), 0);
    }

    #[test]
    fn emission_line_format() {
        let e = Emission::new("10.0.0.1", 1500);
        assert_eq!(e.to_string(), "10.0.0.1\t1500");
        assert_eq!(Emission::parse_line("10.0.0.1\t1500\n"), Some(e));
    }

    #[test]
    fn parse_line_rejects_malformed() {
        for bad in ["", "10.0.0.1", "10.0.0.1\tx", "10.0.0.1\t5\t6", "\t5", "a\t-1"] {
            assert_eq!(Emission::parse_line(bad), None, "{bad:?}");
        }
    }
}

//! Small helpers shared by the stages.
//!

use anyhow::{Context, Result};
use bytes::Bytes;
use std::io::BufRead;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String> {
    Ok(String::from_utf8(buf.as_ref().into())?)
}

/// Calls `f` with every line of `input` as raw bytes, terminator included.
///
/// Lines are not required to be UTF-8; the caller decides what to do with
/// ones that are not. The final line need not end in a newline.
pub fn for_each_line<R, F>(mut input: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&[u8]) -> Result<()>,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).context("failed to read input")? == 0 {
            return Ok(());
        }
        f(&line)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_line_including_unterminated_tail() {
        let mut seen = Vec::new();
        for_each_line(&b"a\nb\r\n\xffc"[..], |line| {
            seen.push(line.to_vec());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![b"a\n".to_vec(), b"b\r\n".to_vec(), b"\xffc".to_vec()]);
    }

    #[test]
    fn rejects_invalid_utf8_bytes() {
        assert!(string_from_bytes(Bytes::from_static(b"\xff")).is_err());
        assert_eq!(string_from_bytes(Bytes::from_static(b"ok")).unwrap(), "ok");
    }
}

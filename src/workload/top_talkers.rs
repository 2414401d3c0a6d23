//! The top-talkers job as a MapReduce-compatible workload.
//!
//! Both halves delegate to the streaming stages so the standalone engine and
//! the `tt-mapper`/`tt-reducer` filters share one implementation.

use crate::mapper::{self, MapperConfig};
use crate::reducer::AggregationState;
use crate::record::{parse_byte_count, Emission};
use crate::utils::string_from_bytes;
use crate::*;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;
use tracing::debug;

pub fn map(input: &mut dyn BufRead, emit: &mut dyn FnMut(KeyValue)) -> Result<()> {
    let stats = mapper::map_records(input, &MapperConfig::default(), |emission| {
        emit(emission.into());
        Ok(())
    })?;
    debug!(?stats, "mapped split");
    Ok(())
}

pub fn reduce(key: Bytes, values: Box<dyn Iterator<Item = Bytes> + '_>) -> Result<Bytes> {
    let address = string_from_bytes(key)?;
    let mut state = AggregationState::new();
    for value in values {
        let Some(byte_count) = std::str::from_utf8(&value).ok().and_then(parse_byte_count) else {
            continue;
        };
        // one key per call, so the state never completes a group early
        state.push(Emission::new(address.clone(), byte_count));
    }
    match state.finish() {
        Some(total) => Ok(Bytes::from(format!("{total}\n"))),
        None => Ok(Bytes::new()),
    }
}

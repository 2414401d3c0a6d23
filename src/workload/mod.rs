//! Converts MapReduce application names to actual application code.
//!
//! # Example
//!
//! ```
//! # use anyhow::Result;
//! use toptalkers::workload;
//! # fn main() -> Result<()> {
//! let app = workload::named("top-talkers")?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

use crate::Workload;
use anyhow::{bail, Result};

pub mod top_talkers;

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "top-talkers" => Some(Workload {
            map_fn: top_talkers::map,
            reduce_fn: top_talkers::reduce,
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found.", name),
    }
}

//! Scratch directory removal after a successful relocation.

use std::fs;
use std::path::Path;
use tracing::debug;

use super::remove_entry;
use crate::error::Result;

/// Remove the scratch directory. Already gone is not an error.
pub fn remove_scratch(scratch: &Path) -> Result<()> {
    if fs::symlink_metadata(scratch).is_err() {
        debug!("Scratch directory {} already gone", scratch.display());
        return Ok(());
    }
    remove_entry(scratch)
}

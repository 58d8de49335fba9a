//! Extracting the archive into a freshly wiped scratch directory.

use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info, warn};

use super::remove_entry;
use crate::error::{DeployError, Result};

/// Unix file type bits for a symbolic link
const S_IFLNK: u32 = 0o120000;
const S_IFMT: u32 = 0o170000;

/// Wipe `scratch`, recreate it empty and extract `archive` into it
///
/// Relative paths inside the archive are preserved. Entries that would land
/// outside `scratch` and symlink entries are skipped. Returns the number of
/// entries written.
pub fn extract_archive(archive: &Path, scratch: &Path) -> Result<usize> {
    if fs::symlink_metadata(scratch).is_ok() {
        debug!("Wiping stale scratch directory {}", scratch.display());
        remove_entry(scratch)?;
    }
    fs::create_dir_all(scratch).map_err(DeployError::fs("create scratch directory", scratch))?;

    let file = File::open(archive).map_err(DeployError::fs("open archive", archive))?;
    let mut zip = zip::ZipArchive::new(file)?;

    let scratch_root = scratch
        .canonicalize()
        .map_err(DeployError::fs("resolve scratch directory", scratch))?;

    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel_path) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };

        if entry.unix_mode().is_some_and(|mode| (mode & S_IFMT) == S_IFLNK) {
            warn!("Skipping symlink archive entry: {}", entry.name());
            continue;
        }

        let outpath = scratch_root.join(&rel_path);
        if !outpath.starts_with(&scratch_root) {
            warn!("Skipping archive entry outside scratch: {}", entry.name());
            continue;
        }

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(DeployError::fs("create directory", &outpath))?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(DeployError::fs("create directory", parent))?;
            }
            let mut outfile =
                File::create(&outpath).map_err(DeployError::fs("create file", &outpath))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(DeployError::fs("write file", &outpath))?;
        }
        extracted += 1;
    }

    info!(
        "Extracted {} entries from {} into {}",
        extracted,
        archive.display(),
        scratch.display()
    );
    Ok(extracted)
}

//! Finding and removing previously installed versions of an extension.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::remove_entry;
use crate::error::{DeployError, Result};

/// Does `name` belong to the extension identified by `prefix`?
///
/// Matches the bare prefix and `<prefix>-<version>` where the version starts
/// with a digit. `acme.widgets-pack` or `acme.widgetsfoo` are different
/// extensions and never match `acme.widgets`.
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('-')
            .is_some_and(|version| version.starts_with(|c: char| c.is_ascii_digit())),
        None => false,
    }
}

/// List entries of `dir` that match `prefix`, sorted by path
pub fn find_old_versions(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(DeployError::fs("read extensions directory", dir))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(DeployError::fs("read extensions directory", dir))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("Skipping non UTF-8 entry {:?}", file_name);
            continue;
        };
        if matches_prefix(name, prefix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Remove every entry of `dir` matching `prefix`
///
/// `on_removing` is called before each deletion. The first failure aborts the
/// whole step; entries already deleted stay deleted.
pub fn remove_old_versions(
    dir: &Path,
    prefix: &str,
    mut on_removing: impl FnMut(&Path),
) -> Result<Vec<PathBuf>> {
    let old_versions = find_old_versions(dir, prefix)?;
    for path in &old_versions {
        on_removing(path);
        info!("Removing old extension: {}", path.display());
        remove_entry(path)?;
    }
    Ok(old_versions)
}

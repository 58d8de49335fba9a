//! Moving the payload subfolder out of scratch into its install location.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::remove_entry;
use crate::error::{DeployError, Result};

/// Move `<scratch>/<subfolder>` to `target`, replacing whatever is there
///
/// A missing subfolder is reported as [`DeployError::MissingSubfolder`] and
/// nothing at `target` is touched.
pub fn relocate(scratch: &Path, subfolder: &str, target: &Path) -> Result<()> {
    let source = scratch.join(subfolder);
    if !source.is_dir() {
        return Err(DeployError::MissingSubfolder {
            subfolder: subfolder.to_string(),
            scratch: scratch.to_path_buf(),
        });
    }

    if fs::symlink_metadata(target).is_ok() {
        debug!("Replacing existing target {}", target.display());
        remove_entry(target)?;
    }

    move_dir(&source, target)?;
    info!("Moved {} to {}", source.display(), target.display());
    Ok(())
}

/// Rename when possible, copy and delete when crossing filesystems
fn move_dir(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                "{} and {} are on different filesystems, copying instead",
                source.display(),
                target.display()
            );
            copy_tree(source, target)?;
            fs::remove_dir_all(source).map_err(DeployError::fs("remove", source))
        }
        Err(e) => Err(DeployError::fs("move", source)(e)),
    }
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| DeployError::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| DeployError::general(format!("Unexpected path during copy: {}", e)))?;
        let dest = target.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(DeployError::fs("create directory", &dest))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &dest).map_err(DeployError::fs("copy to", &dest))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, dest: &Path) -> Result<()> {
    let points_to = fs::read_link(link).map_err(DeployError::fs("read link", link))?;
    std::os::unix::fs::symlink(points_to, dest).map_err(DeployError::fs("create link", dest))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, _dest: &Path) -> Result<()> {
    warn!("Skipping symlink {}", link.display());
    Ok(())
}

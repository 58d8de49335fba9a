//! Extension deployment
//!
//! Installs the payload of a packaged extension into an extensions directory
//! in four sequential steps:
//!
//! 1. remove previously installed versions ([`locator`])
//! 2. extract the archive into a wiped scratch directory ([`unpacker`])
//! 3. move the payload subfolder to the target path ([`relocator`])
//! 4. remove the scratch directory ([`cleaner`])
//!
//! Each step's postcondition is the next step's precondition. The first
//! error ends the run; nothing is rolled back. A scratch directory left
//! behind by a failed run is wiped by the next run's extraction step.
//!
//! # Invariants
//!
//! - After a successful run the extensions directory holds exactly one entry
//!   matching the prefix (the target) and no scratch directory.
//! - The scratch directory never matches the prefix, so step 1 cannot
//!   delete it.

pub mod cleaner;
pub mod identity;
pub mod locator;
pub mod relocator;
pub mod unpacker;

pub use identity::{ExtensionIdentity, prefix_from_target_name};
pub use locator::{find_old_versions, matches_prefix};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config_file::DeployConfig;
use crate::error::{DeployError, Result};

/// Fully resolved paths and names for one deploy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub extensions_dir: PathBuf,
    pub archive: PathBuf,
    pub scratch_dir: PathBuf,
    pub target_path: PathBuf,
    pub target_name: String,
    pub prefix: String,
    pub subfolder: String,
}

impl DeployPlan {
    /// Resolve a plan from configuration
    ///
    /// When no target name is configured the archive's manifest is read to
    /// derive one. This only reads the archive.
    pub fn resolve(config: &DeployConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| DeployError::config(format!("{:#}", e)))?;

        let (Some(extensions_dir), Some(archive)) = (&config.extensions_dir, &config.archive)
        else {
            return Err(DeployError::config("extensions_dir and archive are required"));
        };

        let (target_name, prefix) = match (&config.target_name, &config.prefix) {
            (Some(target), Some(prefix)) => (target.clone(), prefix.clone()),
            (Some(target), None) => (target.clone(), prefix_from_target_name(target).to_string()),
            (None, explicit_prefix) => {
                let identity = ExtensionIdentity::read_from_archive(archive, &config.subfolder)?;
                debug!("Archive manifest identity: {:?}", identity);
                let prefix = explicit_prefix.clone().unwrap_or_else(|| identity.prefix());
                (identity.target_name(), prefix)
            }
        };

        if prefix.is_empty() {
            return Err(DeployError::validation(format!(
                "Could not derive a prefix from target name '{}'",
                target_name
            )));
        }
        if !matches_prefix(&target_name, &prefix) {
            return Err(DeployError::validation(format!(
                "Target name '{}' does not match prefix '{}'",
                target_name, prefix
            )));
        }
        if matches_prefix(&config.scratch_name, &prefix) {
            return Err(DeployError::validation(format!(
                "Scratch name '{}' collides with prefix '{}'",
                config.scratch_name, prefix
            )));
        }
        // Step 1 would delete the archive before step 2 reads it
        if archive_in_cleanup_scope(archive, extensions_dir, &prefix) {
            return Err(DeployError::validation(format!(
                "Archive {} sits in the extensions directory and matches prefix '{}'; \
                 move it elsewhere before deploying",
                archive.display(),
                prefix
            )));
        }

        Ok(Self {
            extensions_dir: extensions_dir.clone(),
            archive: archive.clone(),
            scratch_dir: extensions_dir.join(&config.scratch_name),
            target_path: extensions_dir.join(&target_name),
            target_name,
            prefix,
            subfolder: config.subfolder.clone(),
        })
    }
}

/// Progress of a deploy run, in the order the steps emit them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Started { archive: PathBuf, target: PathBuf },
    RemovingOldVersion(PathBuf),
    Extracting,
    Moved(PathBuf),
    Completed,
}

impl fmt::Display for DeployEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { archive, target } => {
                write!(f, "Deploying {} to {}...", archive.display(), target.display())
            }
            Self::RemovingOldVersion(path) => {
                write!(f, "Removing old extension: {}", path.display())
            }
            Self::Extracting => write!(f, "Extracting archive..."),
            Self::Moved(target) => write!(f, "Moved extension content to {}", target.display()),
            Self::Completed => write!(f, "Deployment complete!"),
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub removed: Vec<PathBuf>,
    pub extracted_entries: usize,
    pub target_path: PathBuf,
}

/// Runs the four deploy steps for one plan
#[derive(Debug, Clone)]
pub struct Deployer {
    plan: DeployPlan,
}

impl Deployer {
    pub fn new(plan: DeployPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &DeployPlan {
        &self.plan
    }

    /// Entries step 1 would delete, without deleting anything
    pub fn preview_removals(&self) -> Result<Vec<PathBuf>> {
        find_old_versions(&self.plan.extensions_dir, &self.plan.prefix)
    }

    pub fn run(&self) -> Result<DeployReport> {
        self.run_with(|_| {})
    }

    /// Run every step, reporting progress through `on_event`
    pub fn run_with(&self, mut on_event: impl FnMut(&DeployEvent)) -> Result<DeployReport> {
        let plan = &self.plan;
        on_event(&DeployEvent::Started {
            archive: plan.archive.clone(),
            target: plan.target_path.clone(),
        });

        let removed = locator::remove_old_versions(&plan.extensions_dir, &plan.prefix, |path| {
            on_event(&DeployEvent::RemovingOldVersion(path.to_path_buf()))
        })?;

        on_event(&DeployEvent::Extracting);
        let extracted_entries = unpacker::extract_archive(&plan.archive, &plan.scratch_dir)?;

        relocator::relocate(&plan.scratch_dir, &plan.subfolder, &plan.target_path)?;
        on_event(&DeployEvent::Moved(plan.target_path.clone()));

        cleaner::remove_scratch(&plan.scratch_dir)?;
        on_event(&DeployEvent::Completed);

        info!(
            "Deployed {} ({} old versions removed)",
            plan.target_name,
            removed.len()
        );
        Ok(DeployReport {
            removed,
            extracted_entries,
            target_path: plan.target_path.clone(),
        })
    }
}

/// Is `archive` an entry of `extensions_dir` that old-version cleanup would remove?
fn archive_in_cleanup_scope(archive: &Path, extensions_dir: &Path, prefix: &str) -> bool {
    let Some(name) = archive.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !matches_prefix(name, prefix) {
        return false;
    }
    let parent = match archive.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return false,
    };
    match (fs::canonicalize(parent), fs::canonicalize(extensions_dir)) {
        (Ok(a), Ok(b)) => a == b,
        _ => parent == extensions_dir,
    }
}

/// Remove a file, symlink or directory tree without following symlinks
pub(crate) fn remove_entry(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(DeployError::fs("inspect", path))?;
    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(DeployError::fs("remove", path))
    } else {
        fs::remove_file(path).map_err(DeployError::fs("remove", path))
    }
}

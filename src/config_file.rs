//! Configuration file handling for saving and loading deploy configs.
//!
//! The file is JSON. Optional fields fall back to the conventions of editor
//! extension hosts (`extension/` payload, `temp_extract` scratch directory)
//! and CLI flags override anything read from disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Payload folder inside a `.vsix` archive
pub const DEFAULT_SUBFOLDER: &str = "extension";

/// Scratch directory name, created inside the extensions directory
pub const DEFAULT_SCRATCH_NAME: &str = "temp_extract";

fn default_subfolder() -> String {
    DEFAULT_SUBFOLDER.to_string()
}

fn default_scratch_name() -> String {
    DEFAULT_SCRATCH_NAME.to_string()
}

/// Deploy configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Directory holding installed extensions
    #[serde(default)]
    pub extensions_dir: Option<PathBuf>,

    /// Zip archive to deploy
    #[serde(default)]
    pub archive: Option<PathBuf>,

    /// Installed directory name; derived from the archive manifest when unset
    #[serde(default)]
    pub target_name: Option<String>,

    /// Name stem shared by every installed version of this extension
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default = "default_subfolder")]
    pub subfolder: String,

    #[serde(default = "default_scratch_name")]
    pub scratch_name: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            extensions_dir: None,
            archive: None,
            target_name: None,
            prefix: None,
            subfolder: default_subfolder(),
            scratch_name: default_scratch_name(),
        }
    }
}

impl DeployConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks only what can be checked without touching the filesystem:
    /// required paths are present and every name is a single path component.
    pub fn validate(&self) -> Result<()> {
        if self.extensions_dir.is_none() {
            anyhow::bail!("Extensions directory must be specified");
        }
        if self.archive.is_none() {
            anyhow::bail!("Archive path must be specified");
        }

        validate_component("Subfolder", &self.subfolder)?;
        validate_component("Scratch name", &self.scratch_name)?;
        if let Some(target_name) = &self.target_name {
            validate_component("Target name", target_name)?;
        }
        if let Some(prefix) = &self.prefix {
            validate_component("Prefix", prefix)?;
            // Cleanup of old versions would delete the scratch directory mid-run
            if crate::deploy::matches_prefix(&self.scratch_name, prefix) {
                anyhow::bail!(
                    "Scratch name '{}' collides with prefix '{}'",
                    self.scratch_name,
                    prefix
                );
            }
        }

        Ok(())
    }

    /// Overlay values from `other` on top of this config, field by field
    pub fn merge(mut self, other: ConfigOverrides) -> Self {
        if other.extensions_dir.is_some() {
            self.extensions_dir = other.extensions_dir;
        }
        if other.archive.is_some() {
            self.archive = other.archive;
        }
        if other.target_name.is_some() {
            self.target_name = other.target_name;
        }
        if other.prefix.is_some() {
            self.prefix = other.prefix;
        }
        if let Some(subfolder) = other.subfolder {
            self.subfolder = subfolder;
        }
        if let Some(scratch_name) = other.scratch_name {
            self.scratch_name = scratch_name;
        }
        self
    }
}

/// Values given on the command line; `None` keeps the config file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub extensions_dir: Option<PathBuf>,
    pub archive: Option<PathBuf>,
    pub target_name: Option<String>,
    pub prefix: Option<String>,
    pub subfolder: Option<String>,
    pub scratch_name: Option<String>,
}

/// Names are joined onto directories, so they must be one plain component
fn validate_component(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} must not be empty", label);
    }
    if value.trim() != value {
        anyhow::bail!("{} must not have surrounding whitespace, got '{}'", label, value);
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        anyhow::bail!("{} must be a single directory name, got '{}'", label, value);
    }
    Ok(())
}

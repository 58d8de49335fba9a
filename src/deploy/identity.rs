//! Extension identity read from the `package.json` shipped inside the archive.
//!
//! Editor extension hosts install into `<publisher>.<name>-<version>`, with
//! publisher and name lowercased. The same stem, without the version, is the
//! prefix shared by every installed version.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{DeployError, Result};

/// The fields of an extension manifest needed to name the install directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtensionIdentity {
    pub publisher: String,
    pub name: String,
    pub version: String,
}

impl ExtensionIdentity {
    /// Parse and check a `package.json` document
    pub fn from_manifest_json(json: &str) -> Result<Self> {
        let identity: Self = serde_json::from_str(json)?;
        for (field, value) in [
            ("publisher", &identity.publisher),
            ("name", &identity.name),
            ("version", &identity.version),
        ] {
            if value.trim().is_empty() {
                return Err(DeployError::manifest(format!("'{}' is empty", field)));
            }
            if value.contains(['/', '\\']) {
                return Err(DeployError::manifest(format!(
                    "'{}' contains a path separator: {}",
                    field, value
                )));
            }
        }
        Ok(identity)
    }

    /// Read `<subfolder>/package.json` out of a zip archive without extracting it
    pub fn read_from_archive(archive: &Path, subfolder: &str) -> Result<Self> {
        let file = File::open(archive).map_err(DeployError::fs("open archive", archive))?;
        let mut zip = zip::ZipArchive::new(file)?;

        let manifest_name = format!("{}/package.json", subfolder);
        let mut entry = match zip.by_name(&manifest_name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(DeployError::manifest(format!(
                    "{} not found in {}",
                    manifest_name,
                    archive.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        debug!("Read {} ({} bytes)", manifest_name, content.len());

        Self::from_manifest_json(&content)
    }

    /// `<publisher>.<name>`, lowercased
    pub fn prefix(&self) -> String {
        format!(
            "{}.{}",
            self.publisher.trim().to_lowercase(),
            self.name.trim().to_lowercase()
        )
    }

    /// `<publisher>.<name>-<version>`
    pub fn target_name(&self) -> String {
        format!("{}-{}", self.prefix(), self.version.trim())
    }
}

/// Strip a trailing `-<version>` from an install directory name
///
/// `acme.widgets-0.0.11` gives `acme.widgets`. Names without a version
/// suffix are returned unchanged.
pub fn prefix_from_target_name(target_name: &str) -> &str {
    target_name
        .match_indices('-')
        .find(|(idx, _)| target_name[idx + 1..].starts_with(|c: char| c.is_ascii_digit()))
        .map_or(target_name, |(idx, _)| &target_name[..idx])
}

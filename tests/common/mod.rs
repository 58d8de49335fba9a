#![allow(dead_code)]

use assert_cmd::Command;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const PREFIX: &str = "acme.widgets";
pub const TARGET_NAME: &str = "acme.widgets-1.2.0";

pub const MANIFEST: &str = r#"{
  "name": "Widgets",
  "publisher": "Acme",
  "version": "1.2.0"
}"#;

pub fn extdeploy_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("extdeploy"))
}

/// Write a zip archive with the given `(name, content)` entries
pub fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, SimpleFileOptions::default())
                .expect("add directory");
        } else {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("start file");
            zip.write_all(content.as_bytes()).expect("write entry");
        }
    }
    zip.finish().expect("finish archive");
}

/// A scratch filesystem with an extensions directory and a packaged extension
pub struct Workspace {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub extensions_dir: PathBuf,
    pub archive: PathBuf,
}

impl Workspace {
    /// Workspace whose archive holds a typical `.vsix` layout
    pub fn new() -> Self {
        Self::with_entries(&[
            ("[Content_Types].xml", "<Types/>"),
            ("extension.vsixmanifest", "<PackageManifest/>"),
            ("extension/", ""),
            ("extension/package.json", MANIFEST),
            ("extension/out/extension.js", "exports.activate = () => {};"),
            ("extension/README.md", "# Widgets"),
        ])
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let extensions_dir = root.join("extensions");
        fs::create_dir_all(&extensions_dir).expect("create extensions dir");
        let archive = root.join("acme.widgets-1.2.0.vsix");
        write_archive(&archive, entries);

        Self {
            _temp_dir: temp_dir,
            root,
            extensions_dir,
            archive,
        }
    }

    /// Seed an installed version directory with one file
    pub fn install_old_version(&self, name: &str) -> PathBuf {
        let dir = self.extensions_dir.join(name);
        fs::create_dir_all(dir.join("out")).expect("create old version");
        fs::write(dir.join("out/extension.js"), "old").expect("write old version");
        dir
    }

    /// Sorted names of the entries in the extensions directory
    pub fn installed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.extensions_dir)
            .expect("read extensions dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Relative path and content of every file under `dir`, sorted
pub fn snapshot_tree(dir: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.expect("walk entry");
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .expect("strip prefix")
                .to_string_lossy()
                .into_owned();
            let content = fs::read_to_string(entry.path()).expect("read file");
            files.push((rel, content));
        }
    }
    files.sort();
    files
}

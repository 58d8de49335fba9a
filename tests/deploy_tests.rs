//! Tests for the deploy procedure
//!
//! These tests verify, against a real temporary filesystem:
//! - Old versions are removed and unrelated entries survive
//! - The target holds exactly the payload and scratch is gone
//! - A missing payload aborts before relocation
//! - Running twice gives the same result as running once

mod common;

use common::{PREFIX, TARGET_NAME, Workspace, snapshot_tree, write_archive};
use extdeploy::deploy::find_old_versions;
use extdeploy::{DeployConfig, DeployError, DeployEvent, DeployPlan, Deployer};
use std::fs;

fn plan_for(ws: &Workspace) -> DeployPlan {
    let config = DeployConfig {
        extensions_dir: Some(ws.extensions_dir.clone()),
        archive: Some(ws.archive.clone()),
        ..DeployConfig::default()
    };
    DeployPlan::resolve(&config).expect("Should resolve plan")
}

// =============================================================================
// Plan Resolution Tests
// =============================================================================

#[test]
fn test_plan_derives_names_from_manifest() {
    let ws = Workspace::new();
    let plan = plan_for(&ws);

    assert_eq!(plan.target_name, TARGET_NAME);
    assert_eq!(plan.prefix, PREFIX);
    assert_eq!(plan.target_path, ws.extensions_dir.join(TARGET_NAME));
    assert_eq!(plan.scratch_dir, ws.extensions_dir.join("temp_extract"));
}

#[test]
fn test_plan_without_manifest_needs_target_name() {
    let ws = Workspace::with_entries(&[("extension/out/extension.js", "x")]);
    let config = DeployConfig {
        extensions_dir: Some(ws.extensions_dir.clone()),
        archive: Some(ws.archive.clone()),
        ..DeployConfig::default()
    };

    let err = DeployPlan::resolve(&config).unwrap_err();
    assert!(matches!(err, DeployError::Manifest(_)));

    let config = DeployConfig {
        target_name: Some("acme.widgets-9.9.9".to_string()),
        ..config
    };
    let plan = DeployPlan::resolve(&config).expect("Explicit target name should resolve");
    assert_eq!(plan.prefix, PREFIX);
}

// =============================================================================
// Full Procedure Tests
// =============================================================================

#[test]
fn test_deploy_replaces_old_versions() {
    let ws = Workspace::new();
    ws.install_old_version("acme.widgets-1.0.0");
    ws.install_old_version("acme.widgets-1.1.9");
    fs::write(ws.extensions_dir.join("acme.widgets-0.9.0"), "stray file").expect("write");
    ws.install_old_version("acme.widgets-pack-2.0.0");
    ws.install_old_version("other.tool-0.1.0");
    fs::write(ws.extensions_dir.join("extensions.json"), "[]").expect("write");

    let report = Deployer::new(plan_for(&ws)).run().expect("Should deploy");

    assert_eq!(report.removed.len(), 3);
    assert_eq!(
        ws.installed_names(),
        vec![
            "acme.widgets-1.2.0",
            "acme.widgets-pack-2.0.0",
            "extensions.json",
            "other.tool-0.1.0",
        ]
    );
}

#[test]
fn test_target_matches_payload_and_scratch_is_gone() {
    let ws = Workspace::new();
    let plan = plan_for(&ws);
    let target = plan.target_path.clone();
    let scratch = plan.scratch_dir.clone();

    let report = Deployer::new(plan).run().expect("Should deploy");

    assert_eq!(report.target_path, target);
    assert_eq!(report.extracted_entries, 6);
    assert!(!scratch.exists(), "Scratch directory should be removed");
    assert_eq!(
        snapshot_tree(&target),
        vec![
            ("README.md".to_string(), "# Widgets".to_string()),
            (
                "out/extension.js".to_string(),
                "exports.activate = () => {};".to_string()
            ),
            ("package.json".to_string(), common::MANIFEST.to_string()),
        ]
    );
}

#[test]
fn test_events_are_emitted_in_order() {
    let ws = Workspace::new();
    let old = ws.install_old_version("acme.widgets-1.0.0");
    let plan = plan_for(&ws);
    let target = plan.target_path.clone();

    let mut events = Vec::new();
    Deployer::new(plan)
        .run_with(|event| events.push(event.clone()))
        .expect("Should deploy");

    assert_eq!(
        events,
        vec![
            DeployEvent::Started {
                archive: ws.archive.clone(),
                target: target.clone(),
            },
            DeployEvent::RemovingOldVersion(old),
            DeployEvent::Extracting,
            DeployEvent::Moved(target),
            DeployEvent::Completed,
        ]
    );
}

#[test]
fn test_missing_subfolder_aborts_without_relocation() {
    let ws = Workspace::with_entries(&[("payload/package.json", common::MANIFEST)]);
    let config = DeployConfig {
        extensions_dir: Some(ws.extensions_dir.clone()),
        archive: Some(ws.archive.clone()),
        target_name: Some(TARGET_NAME.to_string()),
        ..DeployConfig::default()
    };
    let plan = DeployPlan::resolve(&config).expect("Should resolve");
    let target = plan.target_path.clone();
    let scratch = plan.scratch_dir.clone();

    let err = Deployer::new(plan).run().unwrap_err();

    assert!(err.is_missing_subfolder());
    assert!(!target.exists(), "Nothing should be relocated");
    // aborted runs leave scratch behind for the next run to wipe
    assert!(scratch.join("payload/package.json").exists());
}

#[test]
fn test_stale_scratch_from_failed_run_is_recovered() {
    let ws = Workspace::new();
    let plan = plan_for(&ws);
    fs::create_dir_all(plan.scratch_dir.join("extension/leftover")).expect("mkdir");

    Deployer::new(plan.clone()).run().expect("Should deploy");

    assert!(!plan.scratch_dir.exists());
    assert!(!plan.target_path.join("leftover").exists());
}

#[test]
fn test_deploy_is_idempotent() {
    let ws = Workspace::new();
    let deployer = Deployer::new(plan_for(&ws));

    let first = deployer.run().expect("First deploy");
    let after_first = snapshot_tree(&first.target_path);
    let names_after_first = ws.installed_names();

    let second = deployer.run().expect("Second deploy");
    assert_eq!(second.removed, vec![first.target_path.clone()]);
    assert_eq!(snapshot_tree(&second.target_path), after_first);
    assert_eq!(ws.installed_names(), names_after_first);
}

#[test]
fn test_missing_extensions_dir_is_fatal() {
    let ws = Workspace::new();
    let mut plan = plan_for(&ws);
    plan.extensions_dir = ws.root.join("does-not-exist");

    let err = Deployer::new(plan).run().unwrap_err();
    assert!(matches!(err, DeployError::Filesystem { .. }));
}

#[test]
fn test_corrupt_archive_is_fatal() {
    let ws = Workspace::new();
    let plan = plan_for(&ws);
    fs::write(&ws.archive, "not a zip anymore").expect("corrupt archive");

    let err = Deployer::new(plan).run().unwrap_err();
    assert!(matches!(err, DeployError::Archive(_)));
}

#[test]
fn test_unsafe_entries_are_skipped() {
    let ws = Workspace::new();
    write_archive(
        &ws.archive,
        &[
            ("../escaped.txt", "nope"),
            ("extension/package.json", common::MANIFEST),
        ],
    );
    let plan = plan_for(&ws);

    Deployer::new(plan.clone()).run().expect("Should deploy");

    assert!(!ws.root.join("escaped.txt").exists());
    assert!(!ws.extensions_dir.join("escaped.txt").exists());
    assert!(plan.target_path.join("package.json").is_file());
}

#[test]
fn test_preview_removals_changes_nothing() {
    let ws = Workspace::new();
    let old = ws.install_old_version("acme.widgets-1.0.0");
    let deployer = Deployer::new(plan_for(&ws));

    let preview = deployer.preview_removals().expect("Should preview");

    assert_eq!(preview, vec![old.clone()]);
    assert!(old.exists());
    assert_eq!(
        find_old_versions(&ws.extensions_dir, PREFIX).expect("Should list"),
        preview
    );
}

#[test]
fn test_archive_inside_extensions_dir_is_refused() {
    let ws = Workspace::new();
    let old = ws.install_old_version("acme.widgets-1.0.0");
    let archive = ws.extensions_dir.join("acme.widgets-1.2.0.vsix");
    fs::copy(&ws.archive, &archive).expect("copy archive");

    let config = DeployConfig {
        extensions_dir: Some(ws.extensions_dir.clone()),
        archive: Some(archive.clone()),
        ..DeployConfig::default()
    };
    let err = DeployPlan::resolve(&config).unwrap_err();

    assert!(matches!(err, DeployError::Validation(_)));
    assert!(archive.is_file(), "Archive must survive");
    assert!(old.exists(), "Old versions must not be touched");
}

#[test]
fn test_unrelated_archive_inside_extensions_dir_is_allowed() {
    let ws = Workspace::new();
    let archive = ws.extensions_dir.join("widgets-latest.vsix");
    fs::copy(&ws.archive, &archive).expect("copy archive");

    let config = DeployConfig {
        extensions_dir: Some(ws.extensions_dir.clone()),
        archive: Some(archive.clone()),
        ..DeployConfig::default()
    };
    let plan = DeployPlan::resolve(&config).expect("Should resolve");
    Deployer::new(plan).run().expect("Should deploy");

    assert!(archive.is_file());
    assert!(ws.extensions_dir.join(TARGET_NAME).is_dir());
}

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Integration tests for the `build` phase.
//!
//! Each test writes a `manifest.cfg` into a fresh tool root, runs
//! [`BuildPackage`] against a temporary live tree, and inspects the manifest
//! and package that result.

mod common;

use common::IntegrationTestContext;
use filepatch::tasks::build::BuildPackage;
use filepatch::tasks::{Task, TaskResult};

#[cfg(unix)]
#[test]
fn manifest_line_format() {
    let env = IntegrationTestContext::new();
    env.write_live("app/hello.conf", "hello\n");
    env.track(&["app"]);

    let result = BuildPackage.run(&env.context(false)).unwrap();
    assert!(matches!(result, TaskResult::Ok));

    insta::assert_snapshot!(env.manifest_snapshot(), @r"
    -,<live>/app
    5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03,<live>/app/hello.conf
    ");
}

#[test]
fn package_mirrors_live_structure() {
    let env = IntegrationTestContext::new();
    let nested = env.write_live("etc/app/conf.d/nested.conf", "nested");
    env.write_live("etc/app/main.conf", "main");
    env.track(&["etc/app"]);

    let ctx = env.context(false);
    BuildPackage.run(&ctx).unwrap();

    let staged = ctx.package().source_for(&nested).unwrap();
    assert!(staged.starts_with(env.root_path()));
    assert_eq!(std::fs::read_to_string(staged).unwrap(), "nested");
    assert_eq!(ctx.manifest_store().load_all().unwrap().len(), 4);
}

#[cfg(unix)]
#[test]
fn ownership_fields_recorded_when_supported() {
    use std::os::unix::fs::PermissionsExt as _;

    let env = IntegrationTestContext::new().with_ownership();
    let conf = env.write_live("app.conf", "x");
    std::fs::set_permissions(&conf, std::fs::Permissions::from_mode(0o640)).unwrap();
    env.track(&["app.conf"]);

    let ctx = env.context(false);
    BuildPackage.run(&ctx).unwrap();

    let records = ctx.manifest_store().load_all().unwrap();
    assert_eq!(records.len(), 1);
    let ownership = records[0].ownership.expect("ownership recorded");
    assert_eq!(ownership.mode, 0o640);
}

#[test]
fn missing_tracked_list_is_skipped() {
    let env = IntegrationTestContext::new();
    let result = BuildPackage.run(&env.context(false)).unwrap();
    assert!(matches!(result, TaskResult::Skipped(_)));
    assert!(!env.root_path().join("manifest").exists());
}

#[test]
fn relative_tracked_path_is_an_error() {
    let env = IntegrationTestContext::new();
    std::fs::write(env.root_path().join("manifest.cfg"), "etc/app\n").unwrap();
    assert!(BuildPackage.run(&env.context(false)).is_err());
}

#[test]
fn dry_run_leaves_tool_root_empty() {
    let env = IntegrationTestContext::new();
    env.write_live("app/a.conf", "a");
    env.track(&["app"]);

    let result = BuildPackage.run(&env.context(true)).unwrap();
    assert!(matches!(result, TaskResult::DryRun));
    assert!(!env.root_path().join("manifest").exists());
    assert!(!env.root_path().join("files").exists());
}

#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the `patch` phase: drift detection, replacement,
//! backups and idempotence against a package produced by a real build.

mod common;

use common::IntegrationTestContext;
use filepatch::tasks::build::{BuildPackage, build};
use filepatch::tasks::patch::{ApplyPatch, patch};
use filepatch::tasks::{Task, TaskResult};

fn built_env() -> IntegrationTestContext {
    let env = IntegrationTestContext::new();
    env.write_live("app/main.conf", "main v1");
    env.write_live("app/conf.d/extra.conf", "extra v1");
    env.track(&["app"]);
    BuildPackage.run(&env.context(false)).unwrap();
    env
}

#[test]
fn untouched_tree_needs_no_patch() {
    let env = built_env();
    let ctx = env.context(false);
    let stats = patch(&ctx, ctx.manifest_store().load_all().unwrap()).unwrap();
    assert_eq!(stats.changed, 0);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.already_ok, 4);
}

#[test]
fn drifted_and_deleted_entries_are_repaired() {
    let env = built_env();
    env.write_live("app/main.conf", "main v2");
    std::fs::remove_dir_all(env.live_path("app/conf.d")).unwrap();

    let ctx = env.context(false);
    let stats = patch(&ctx, ctx.manifest_store().load_all().unwrap()).unwrap();
    assert_eq!(stats.changed, 3);
    assert_eq!(env.read_live("app/main.conf"), "main v1");
    assert_eq!(env.read_live("app/conf.d/extra.conf"), "extra v1");

    let backup = ctx.vault().entry_for(&env.live_path("app/main.conf")).unwrap();
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "main v2");
}

#[test]
fn second_patch_is_a_no_op() {
    let env = built_env();
    env.write_live("app/main.conf", "main v2");

    let ctx = env.context(false);
    let first = patch(&ctx, ctx.manifest_store().load_all().unwrap()).unwrap();
    assert_eq!(first.changed, 1);
    let second = patch(&ctx, ctx.manifest_store().load_all().unwrap()).unwrap();
    assert_eq!(second.changed, 0);
}

#[cfg(unix)]
#[test]
fn recreated_file_gets_recorded_mode() {
    use std::os::unix::fs::PermissionsExt as _;

    let env = IntegrationTestContext::new().with_ownership();
    let conf = env.write_live("app/secret.conf", "s");
    std::fs::set_permissions(&conf, std::fs::Permissions::from_mode(0o600)).unwrap();
    env.track(&["app"]);
    let ctx = env.context(false);
    build(&ctx, &[env.live_path("app")]).unwrap();

    std::fs::remove_file(&conf).unwrap();
    patch(&ctx, ctx.manifest_store().load_all().unwrap()).unwrap();

    assert_eq!(env.read_live("app/secret.conf"), "s");
    let mode = std::fs::metadata(&conf).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o600);
}

#[test]
fn dry_run_reports_without_writing() {
    let env = built_env();
    env.write_live("app/main.conf", "main v2");

    let result = ApplyPatch.run(&env.context(true)).unwrap();
    assert!(matches!(result, TaskResult::DryRun));
    assert_eq!(env.read_live("app/main.conf"), "main v2");
}

#[test]
fn malformed_manifest_aborts() {
    let env = built_env();
    std::fs::write(env.root_path().join("manifest"), "not-a-record\n").unwrap();
    assert!(ApplyPatch.run(&env.context(false)).is_err());
}

#[cfg(unix)]
#[test]
fn ownership_failure_aborts_before_later_records() {
    use std::os::unix::fs::MetadataExt as _;

    use filepatch::manifest::{Fingerprint, ManifestRecord, Ownership};
    use filepatch::resources::fingerprint::fingerprint_file;

    let env = IntegrationTestContext::new().with_ownership();
    let first = env.write_live("app/first.conf", "first");
    let second = env.write_live("app/second.conf", "second");
    let meta = std::fs::metadata(&second).unwrap();
    if meta.uid() == 0 {
        // Root may chown to anyone, so nothing fails.
        return;
    }

    let ctx = env.context(false);
    let package = ctx.package();
    let record = |path: &std::path::Path, uid: u32, gid: u32| {
        assert!(package.stage(path).unwrap());
        ManifestRecord {
            fingerprint: Fingerprint::Content(fingerprint_file(path).unwrap()),
            path: path.to_path_buf(),
            ownership: Some(Ownership {
                uid,
                gid,
                mode: 0o644,
            }),
        }
    };
    let lines = [
        record(&first, 0, 0).to_line().unwrap(),
        record(&second, meta.uid(), meta.gid()).to_line().unwrap(),
    ];
    std::fs::write(env.root_path().join("manifest"), lines.join("\n") + "\n").unwrap();
    std::fs::remove_file(&first).unwrap();
    std::fs::remove_file(&second).unwrap();

    assert!(ApplyPatch.run(&ctx).is_err());
    assert!(!second.exists(), "records after the failure must not be applied");
}

// Shared helpers for integration tests.
//
// Provides a temporary tool root plus a separate temporary "live" tree, so
// each integration test can run build, patch and restore end to end without
// touching the real filesystem.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use filepatch::config::Config;
use filepatch::logging::{Log, Logger};
use filepatch::platform::{Os, Platform};
use filepatch::tasks::Context;

/// An isolated tool root and live tree, both backed by
/// [`tempfile::TempDir`] and deleted on drop.
pub struct IntegrationTestContext {
    /// Tool root holding `manifest.cfg`, the manifest, package and backups.
    pub root: tempfile::TempDir,
    /// Stand-in for the live system.
    pub live: tempfile::TempDir,
    ownership: bool,
}

impl IntegrationTestContext {
    /// Create a context whose platform records no ownership, so manifest
    /// lines are deterministic.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create tool root"),
            live: tempfile::tempdir().expect("create live tree"),
            ownership: false,
        }
    }

    /// Record and re-apply owner, group and permission bits.
    pub fn with_ownership(mut self) -> Self {
        self.ownership = true;
        self
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path under the live tree.
    pub fn live_path(&self, rel: &str) -> PathBuf {
        self.live.path().join(rel)
    }

    /// Write `content` to `rel` under the live tree, creating parents.
    pub fn write_live(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.live_path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create live parent");
        }
        std::fs::write(&path, content).expect("write live file");
        path
    }

    pub fn read_live(&self, rel: &str) -> String {
        std::fs::read_to_string(self.live_path(rel)).expect("read live file")
    }

    /// Write `manifest.cfg` listing the given live-tree roots.
    pub fn track(&self, rels: &[&str]) {
        let lines: Vec<String> = rels
            .iter()
            .map(|rel| self.live_path(rel).display().to_string())
            .collect();
        std::fs::write(
            self.root_path().join("manifest.cfg"),
            format!("# tracked roots\n{}\n", lines.join("\n")),
        )
        .expect("write manifest.cfg");
    }

    /// Build a phase context from the tool root's configuration.
    pub fn context(&self, dry_run: bool) -> Context {
        let config = Config::load(self.root_path()).expect("load config");
        let platform = if self.ownership {
            Platform::new(Os::Linux, cfg!(unix))
        } else {
            Platform::new(Os::Linux, false)
        };
        let log: Arc<dyn Log> = Arc::new(Logger::new("integration"));
        Context::new(Arc::new(config), Arc::new(platform), log, dry_run)
    }

    /// Manifest contents with the live-tree prefix replaced by `<live>` and
    /// lines sorted, since sibling enumeration order is not fixed.
    pub fn manifest_snapshot(&self) -> String {
        let raw = std::fs::read_to_string(self.root_path().join("manifest"))
            .expect("read manifest");
        let prefix = self.live.path().display().to_string();
        let mut lines: Vec<String> = raw
            .lines()
            .map(|line| line.replace(&prefix, "<live>"))
            .collect();
        lines.sort();
        lines.join("\n")
    }
}

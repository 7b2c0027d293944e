// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed configuration root with `leafs/` and
// `actions/`, a fluent builder for populating it, and a launcher that records
// what it was asked to do instead of spawning anything.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use connectables::catalog::Catalog;
use connectables::config::ConfigRoot;
use connectables::error::Result;
use connectables::exec::Launcher;

/// An isolated configuration root backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory used as the configuration root.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with empty `leafs/` and `actions/` directories.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let config = ConfigRoot::new(root.path());
        std::fs::create_dir_all(config.leafs_dir()).expect("create leafs dir");
        std::fs::create_dir_all(config.actions_dir()).expect("create actions dir");
        Self { root }
    }

    /// Path to the configuration root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// A [`ConfigRoot`] over this context.
    pub fn config_root(&self) -> ConfigRoot {
        ConfigRoot::new(self.root.path())
    }

    /// A fresh catalog (and therefore a fresh action cache) over this context.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.config_root())
    }

    /// Write `leafs/<file>`, replacing any previous content.
    pub fn write_device(&self, file: &str, content: &str) {
        std::fs::write(self.config_root().leafs_dir().join(file), content)
            .expect("write device file");
    }

    /// Write `actions/<file>`, replacing any previous content.
    pub fn write_action(&self, file: &str, content: &str) {
        std::fs::write(self.config_root().actions_dir().join(file), content)
            .expect("write action file");
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new, empty context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Add a device file, e.g. `with_device("nas.yaml", "actions: [ssh]")`.
    pub fn with_device(self, file: &str, content: &str) -> Self {
        self.ctx.write_device(file, content);
        self
    }

    /// Add an action file, e.g. `with_action("ssh.yaml", "type: command")`.
    pub fn with_action(self, file: &str, content: &str) -> Self {
        self.ctx.write_action(file, content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// One call received by a [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launched {
    /// `launch_command(cmdline, env)`
    Command(String, BTreeMap<String, String>),
    /// `open_uri(uri)`
    Uri(String),
}

/// A [`Launcher`] that records calls instead of spawning processes.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    calls: Mutex<Vec<Launched>>,
}

impl RecordingLauncher {
    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Launched> {
        self.calls.lock().expect("launcher lock").clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch_command(&self, cmdline: &str, env: &BTreeMap<String, String>) -> Result<()> {
        self.calls
            .lock()
            .expect("launcher lock")
            .push(Launched::Command(cmdline.to_string(), env.clone()));
        Ok(())
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("launcher lock")
            .push(Launched::Uri(uri.to_string()));
        Ok(())
    }
}

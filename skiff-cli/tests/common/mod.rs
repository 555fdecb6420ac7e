//! Common test utilities for CLI integration tests.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with an isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the skiff data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("skiff-data");
        Self { temp_dir, data_dir }
    }

    /// A bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        Command::cargo_bin("skiff").expect("Failed to find skiff binary")
    }

    /// A command builder with the data directory pre-configured and the
    /// runtime binary pointed at something that does not exist, so a
    /// test that unexpectedly reaches the runtime fails loudly rather
    /// than touching a real container tool.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd.arg("--runtime").arg("skiff-test-no-such-runtime");
        cmd
    }

    /// Seed the allocation store with raw contents.
    pub fn write_store(&self, contents: &str) {
        std::fs::create_dir_all(&self.data_dir).expect("Failed to create data dir");
        std::fs::write(self.data_dir.join("ports"), contents).expect("Failed to write store");
    }

    /// Read the allocation store back.
    pub fn read_store(&self) -> String {
        std::fs::read_to_string(self.data_dir.join("ports")).expect("Failed to read store")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

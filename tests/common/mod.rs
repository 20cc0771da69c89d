//! Common test utilities for roster integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/roster/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated configuration.
///
/// Each `TestEnv` creates two temporary directories:
/// - `repo_dir`: Acts as the repository root (project config lives in `.roster/`)
/// - `config_dir`: Holds the system config (via `ROSTER_CONFIG_DIR` env var)
///
/// The `roster()` method returns a `Command` that sets both per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub repo_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            repo_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the roster binary with isolated configuration.
    pub fn roster(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_roster"));
        cmd.current_dir(self.repo_dir.path());
        cmd.env("ROSTER_REPO", self.repo_dir.path());
        cmd.env("ROSTER_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("ROSTER_LOG");
        cmd
    }

    /// Write a project-level config file (`.roster/<name>`).
    pub fn write_project_config(&self, name: &str, content: &str) -> std::path::PathBuf {
        let dir = self.repo_dir.path().join(".roster");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a system-level config file.
    pub fn write_system_config(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.config_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a prompt customization file (`.roster/prompts/<name>`).
    pub fn write_prompt(&self, name: &str, content: &str) {
        let dir = self.repo_dir.path().join(".roster").join("prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    /// Get the path to the repo directory.
    pub fn repo_path(&self) -> &std::path::Path {
        self.repo_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

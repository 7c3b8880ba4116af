//! Test environment for isolated Quarry runs.
//!
//! `TestEnv` owns a temp workspace and a temp home so neither the user's
//! config nor their package cache leaks into a test.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Environment variables the binary reads; cleared for every run.
const QUARRY_ENV: &[&str] = &[
    "NUGET_PACKAGES",
    "QUARRY_GLOBAL_PACKAGES",
    "QUARRY_CONFIGURATIONS",
    "QUARRY_FRAMEWORKS",
    "QUARRY_LOG",
];

/// Result of running a Quarry CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

pub struct TestEnv {
    pub workspace: TempDir,
    pub home_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            workspace: TempDir::new().expect("Failed to create workspace dir"),
            home_dir: TempDir::new().expect("Failed to create home dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    /// Global package cache under the temp home.
    pub fn global_cache(&self) -> PathBuf {
        self.home_dir.path().join(".nuget").join("packages")
    }

    pub fn write(&self, relative: &str, content: &str) {
        write_file(&self.path(relative), content.as_bytes());
    }

    pub fn write_home(&self, relative: &str, content: &str) {
        write_file(&self.home_dir.path().join(relative), content.as_bytes());
    }

    /// Run quarry from the workspace root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_quarry"));
        cmd.current_dir(self.workspace.path())
            .args(args)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"));
        for key in QUARRY_ENV {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute quarry");
        output_to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

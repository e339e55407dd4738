//! Common test utilities for provisioner integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway home directory with an empty `PATH`
pub struct TestHome {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Home directory of the provisioner under test
    pub path: PathBuf,
    /// Empty directory used as the only `PATH` entry
    pub bin: PathBuf,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("home");
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&path).expect("Failed to create home directory");
        std::fs::create_dir_all(&bin).expect("Failed to create bin directory");
        Self { temp, path, bin }
    }

    /// Write a config file outside the home directory and return its path
    pub fn write_config(&self, yaml: &str) -> PathBuf {
        let path = self.temp.path().join("config.yaml");
        std::fs::write(&path, yaml).expect("Failed to write config");
        path
    }

    /// Check if a path exists below the home directory
    #[allow(dead_code)]
    pub fn exists(&self, relative: &str) -> bool {
        self.path.join(relative).exists()
    }

    /// Provisioner binary confined to this home
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("provisioner").expect("provisioner binary");
        cmd.env("HOME", &self.path)
            .env("USERPROFILE", &self.path)
            .env("PATH", &self.bin)
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("XDG_DATA_HOME")
            .env_remove("XDG_CACHE_HOME")
            .env_remove("PROVISIONER_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Config pinning a runtime version no machine has, with an installer
/// URL that refuses connections
pub const UNREACHABLE_RUNTIME: &str = "runtime:\n  \
    version: \"2.1\"\n  \
    installer_url: \"http://127.0.0.1:9/python-{release}.exe\"\n";
